//! 배치 작업 단위.
//!
//! 입력 파싱 → 출력 준비 → 다운로드 → 요약 순서로 실행합니다.
//! 입력 형식 오류나 출력 폴더 오류는 조회를 하나도 하지 않고 바로 반환합니다.

use std::path::PathBuf;
use std::sync::Arc;

use stock_core::{DateRange, TickerRequest};
use tokio::sync::mpsc::UnboundedSender;
use tracing::info;

use crate::downloader::{BatchDownloader, BatchReport, ProgressEvent};
use crate::input::{parse_free_text, read_ticker_file, HeaderAliases};
use crate::sink::{ArchiveSink, DirectorySink, FileNaming, ResultSink};
use crate::Result;

/// 티커 목록 출처.
#[derive(Debug, Clone)]
pub enum TickerSource {
    /// 엑셀/CSV 파일
    File(PathBuf),
    /// `티커,이름; 티커,이름` 텍스트
    Text(String),
}

/// 결과 저장 방식.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// 폴더에 종목별 파일 저장
    Directory(FileNaming),
    /// ZIP 하나로 압축
    Archive,
}

impl Default for OutputMode {
    fn default() -> Self {
        Self::Directory(FileNaming::Dated)
    }
}

/// 배치 다운로드 작업.
#[derive(Debug, Clone)]
pub struct BatchJob {
    pub source: TickerSource,
    pub range: DateRange,
    pub output_dir: PathBuf,
    pub mode: OutputMode,
    pub aliases: HeaderAliases,
}

impl BatchJob {
    pub fn new(source: TickerSource, range: DateRange, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            source,
            range,
            output_dir: output_dir.into(),
            mode: OutputMode::default(),
            aliases: HeaderAliases::default(),
        }
    }

    /// 저장 방식 지정
    pub fn with_mode(mut self, mode: OutputMode) -> Self {
        self.mode = mode;
        self
    }

    /// 헤더 별칭 지정
    pub fn with_aliases(mut self, aliases: HeaderAliases) -> Self {
        self.aliases = aliases;
        self
    }

    /// 요청 목록을 읽습니다.
    pub fn load_requests(&self) -> Result<Vec<TickerRequest>> {
        match &self.source {
            TickerSource::File(path) => read_ticker_file(path, &self.aliases),
            TickerSource::Text(text) => parse_free_text(text),
        }
    }

    /// 저장 방식에 맞는 Sink를 만듭니다. 출력 폴더도 이때 만듭니다.
    pub fn create_sink(&self) -> Result<Arc<dyn ResultSink>> {
        let sink: Arc<dyn ResultSink> = match self.mode {
            OutputMode::Directory(naming) => Arc::new(DirectorySink::create(&self.output_dir, naming)?),
            OutputMode::Archive => Arc::new(ArchiveSink::create(&self.output_dir)?),
        };
        Ok(sink)
    }

    /// 작업 전체를 실행합니다.
    pub async fn run(
        &self,
        downloader: &BatchDownloader,
        progress: Option<UnboundedSender<ProgressEvent>>,
    ) -> Result<BatchReport> {
        let requests = self.load_requests()?;
        let sink = self.create_sink()?;

        info!(
            requests = requests.len(),
            output = %self.output_dir.display(),
            mode = ?self.mode,
            "배치 작업 시작"
        );

        downloader.run(requests, self.range, sink, progress).await
    }
}
