// ==========================================
// 판매/재고 분석 대시보드 - 수집 모듈 에러 타입
// ==========================================
// 도구: thiserror 파생 매크로
// ==========================================

use thiserror::Error;

/// 수집(업로드 파싱) 모듈 에러 타입
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 파일 관련 에러 =====
    #[error("파일 형식 미지원: {0} (.xlsx/.xls/.csv 만 지원)")]
    UnsupportedFormat(String),

    #[error("파일 읽기 실패: {0}")]
    FileReadError(String),

    #[error("Excel 파싱 실패: {0}")]
    ExcelParseError(String),

    #[error("CSV 파싱 실패: {0}")]
    CsvParseError(String),

    #[error("워크북에 시트가 없음: {0}")]
    EmptyWorkbook(String),

    // ===== 시트/헤더 관련 에러 =====
    #[error("필수 헤더 누락 (시트 {sheet}): {missing}")]
    MissingHeaders { sheet: String, missing: String },

    #[error("인식할 수 없는 카테고리: {0}")]
    UnknownCategory(String),

    // ===== 설정 에러 =====
    #[error("설정 읽기 실패 ({path}): {message}")]
    ConfigReadError { path: String, message: String },

    // ===== 통합 에러 =====
    #[error("내부 에러: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

impl From<calamine::XlsxError> for ImportError {
    fn from(err: calamine::XlsxError) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

impl From<calamine::XlsError> for ImportError {
    fn from(err: calamine::XlsError) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

/// Result 타입 별칭
pub type ImportResult<T> = Result<T, ImportError>;
