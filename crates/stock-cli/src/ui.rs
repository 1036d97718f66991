//! 진행률 표시.

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use stock_collector::ProgressEvent;
use stock_core::FetchStatus;

/// 스피너 하나 (목록 수집 등 길이를 모르는 작업용).
pub fn spinner(message: impl Into<String>) -> anyhow::Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner} [{elapsed}] {msg}")?);
    pb.set_message(message.into());
    pb.enable_steady_tick(std::time::Duration::from_millis(120));
    Ok(pb)
}

/// 전체/성공/실패 세 줄짜리 다운로드 진행률.
pub struct DownloadProgress {
    _multi: MultiProgress,
    total: ProgressBar,
    success: ProgressBar,
    failure: ProgressBar,
}

impl DownloadProgress {
    pub fn new(length: u64) -> anyhow::Result<Self> {
        let multi = MultiProgress::new();
        let total = multi.add(ProgressBar::new(length));
        let success = multi.add(ProgressBar::new(length));
        let failure = multi.add(ProgressBar::new(length));

        total.set_style(
            ProgressStyle::default_bar()
                .template("전체 [{wide_bar:.cyan/blue}] {pos}/{len} {msg} {spinner}")?,
        );
        success.set_style(
            ProgressStyle::default_bar().template("성공 [{wide_bar:.green/blue}] {pos}/{len}")?,
        );
        failure.set_style(
            ProgressStyle::default_bar().template("실패 [{wide_bar:.red/blue}] {pos}/{len}")?,
        );

        Ok(Self {
            _multi: multi,
            total,
            success,
            failure,
        })
    }

    /// 이벤트 하나 반영.
    pub fn record(&self, event: &ProgressEvent) {
        let length = event.total as u64;
        for bar in [&self.total, &self.success, &self.failure] {
            if bar.length() != Some(length) {
                bar.set_length(length);
            }
        }

        self.total.set_position(event.completed as u64);
        self.total
            .set_message(format!("{} ({})", event.display_name, event.ticker));
        match event.status {
            FetchStatus::Success => self.success.inc(1),
            FetchStatus::Failed => self.failure.inc(1),
        }
    }

    pub fn finish(&self) {
        self.total.finish_with_message("완료");
        self.success.finish();
        self.failure.finish();
    }
}
