use std::fmt;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};

#[derive(Debug, Clone)]
pub enum GeoError {
    Normalization(String),
    BogonRejected(String),
    BackendUnavailable(String),
    CacheRead(String),
    Serialization(String),
    DatabaseLoad(String),
    Config(String),
    FileOperation(String),
}

impl GeoError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            GeoError::Normalization(_) => "G001",
            GeoError::BogonRejected(_) => "G002",
            GeoError::BackendUnavailable(_) => "G003",
            GeoError::CacheRead(_) => "G004",
            GeoError::Serialization(_) => "G005",
            GeoError::DatabaseLoad(_) => "G006",
            GeoError::Config(_) => "G007",
            GeoError::FileOperation(_) => "G008",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            GeoError::Normalization(_) => "Address Normalization Error",
            GeoError::BogonRejected(_) => "Bogon Address Rejected",
            GeoError::BackendUnavailable(_) => "Backend Unavailable",
            GeoError::CacheRead(_) => "Cache Read Error",
            GeoError::Serialization(_) => "Serialization Error",
            GeoError::DatabaseLoad(_) => "Database Load Error",
            GeoError::Config(_) => "Configuration Error",
            GeoError::FileOperation(_) => "File Operation Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            GeoError::Normalization(msg)
            | GeoError::BogonRejected(msg)
            | GeoError::BackendUnavailable(msg)
            | GeoError::CacheRead(msg)
            | GeoError::Serialization(msg)
            | GeoError::DatabaseLoad(msg)
            | GeoError::Config(msg)
            | GeoError::FileOperation(msg) => msg,
        }
    }

    /// Whether the failure is reported to clients as "not found".
    pub fn is_not_found(&self) -> bool {
        matches!(self, GeoError::Normalization(_) | GeoError::BogonRejected(_))
    }

    /// 格式化为彩色输出（用于 Server 模式）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出（用于 CLI 模式）
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for GeoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for GeoError {}

// 便捷的构造函数
impl GeoError {
    pub fn normalization<T: Into<String>>(msg: T) -> Self {
        GeoError::Normalization(msg.into())
    }

    pub fn bogon_rejected<T: Into<String>>(msg: T) -> Self {
        GeoError::BogonRejected(msg.into())
    }

    pub fn backend_unavailable<T: Into<String>>(msg: T) -> Self {
        GeoError::BackendUnavailable(msg.into())
    }

    pub fn cache_read<T: Into<String>>(msg: T) -> Self {
        GeoError::CacheRead(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        GeoError::Serialization(msg.into())
    }

    pub fn database_load<T: Into<String>>(msg: T) -> Self {
        GeoError::DatabaseLoad(msg.into())
    }

    pub fn config<T: Into<String>>(msg: T) -> Self {
        GeoError::Config(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        GeoError::FileOperation(msg.into())
    }
}

impl From<std::io::Error> for GeoError {
    fn from(err: std::io::Error) -> Self {
        GeoError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for GeoError {
    fn from(err: serde_json::Error) -> Self {
        GeoError::Serialization(err.to_string())
    }
}

impl From<maxminddb::MaxMindDbError> for GeoError {
    fn from(err: maxminddb::MaxMindDbError) -> Self {
        GeoError::DatabaseLoad(err.to_string())
    }
}

impl From<config::ConfigError> for GeoError {
    fn from(err: config::ConfigError) -> Self {
        GeoError::Config(err.to_string())
    }
}

impl ResponseError for GeoError {
    fn status_code(&self) -> StatusCode {
        match self {
            GeoError::Normalization(_) | GeoError::BogonRejected(_) => StatusCode::NOT_FOUND,
            GeoError::BackendUnavailable(_) | GeoError::DatabaseLoad(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        match status {
            StatusCode::NOT_FOUND => HttpResponse::build(status)
                .insert_header(("Content-Type", "text/plain; charset=utf-8"))
                .body("404 page not found\n"),
            StatusCode::SERVICE_UNAVAILABLE => HttpResponse::build(status).finish(),
            _ => HttpResponse::build(status)
                .insert_header(("Content-Type", "text/plain; charset=utf-8"))
                .body("Internal Server Error"),
        }
    }
}

pub type Result<T> = std::result::Result<T, GeoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_kinds_map_to_404() {
        for err in [
            GeoError::normalization("no such host"),
            GeoError::bogon_rejected("10.0.0.1"),
        ] {
            assert!(err.is_not_found());
            assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        }
    }

    #[test]
    fn test_backend_failure_maps_to_503() {
        let err = GeoError::backend_unavailable("database not loaded");
        assert!(!err.is_not_found());
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.error_response().status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_serialization_maps_to_500() {
        let err = GeoError::serialization("key must be a string");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code(), "G005");
    }

    #[test]
    fn test_format_simple() {
        let err = GeoError::normalization("lookup example.invalid: no such host");
        assert_eq!(
            err.to_string(),
            "Address Normalization Error: lookup example.invalid: no such host"
        );
    }

    #[test]
    fn test_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: GeoError = io.into();
        assert!(matches!(err, GeoError::FileOperation(_)));
        assert_eq!(err.message(), "missing");
    }
}
