//! Status codes defined by RFC 1945 (HTTP/1.0), RFC 2616 (HTTP/1.1)
//! and RFC 2518 (WebDAV), with their reason phrases.

pub const CONTINUE: u16 = 100;
pub const SWITCHING_PROTOCOLS: u16 = 101;
pub const PROCESSING: u16 = 102;

pub const OK: u16 = 200;
pub const CREATED: u16 = 201;
pub const ACCEPTED: u16 = 202;
pub const NON_AUTHORITATIVE_INFORMATION: u16 = 203;
pub const NO_CONTENT: u16 = 204;
pub const RESET_CONTENT: u16 = 205;
pub const PARTIAL_CONTENT: u16 = 206;
pub const MULTI_STATUS: u16 = 207;

pub const MULTIPLE_CHOICES: u16 = 300;
pub const MOVED_PERMANENTLY: u16 = 301;
pub const MOVED_TEMPORARILY: u16 = 302;
pub const SEE_OTHER: u16 = 303;
pub const NOT_MODIFIED: u16 = 304;
pub const USE_PROXY: u16 = 305;
pub const TEMPORARY_REDIRECT: u16 = 307;

pub const BAD_REQUEST: u16 = 400;
pub const UNAUTHORIZED: u16 = 401;
pub const PAYMENT_REQUIRED: u16 = 402;
pub const FORBIDDEN: u16 = 403;
pub const NOT_FOUND: u16 = 404;
pub const METHOD_NOT_ALLOWED: u16 = 405;
pub const NOT_ACCEPTABLE: u16 = 406;
pub const PROXY_AUTHENTICATION_REQUIRED: u16 = 407;
pub const REQUEST_TIMEOUT: u16 = 408;
pub const CONFLICT: u16 = 409;
pub const GONE: u16 = 410;
pub const LENGTH_REQUIRED: u16 = 411;
pub const PRECONDITION_FAILED: u16 = 412;
pub const REQUEST_TOO_LONG: u16 = 413;
pub const REQUEST_URI_TOO_LONG: u16 = 414;
pub const UNSUPPORTED_MEDIA_TYPE: u16 = 415;
pub const REQUESTED_RANGE_NOT_SATISFIABLE: u16 = 416;
pub const EXPECTATION_FAILED: u16 = 417;
pub const INSUFFICIENT_SPACE_ON_RESOURCE: u16 = 419;
pub const METHOD_FAILURE: u16 = 420;
pub const UNPROCESSABLE_ENTITY: u16 = 422;
pub const LOCKED: u16 = 423;
pub const FAILED_DEPENDENCY: u16 = 424;

pub const INTERNAL_SERVER_ERROR: u16 = 500;
pub const NOT_IMPLEMENTED: u16 = 501;
pub const BAD_GATEWAY: u16 = 502;
pub const SERVICE_UNAVAILABLE: u16 = 503;
pub const GATEWAY_TIMEOUT: u16 = 504;
pub const HTTP_VERSION_NOT_SUPPORTED: u16 = 505;
pub const INSUFFICIENT_STORAGE: u16 = 507;

/// Reason phrase for a known status code.
pub fn reason_for(code: u16) -> Option<&'static str> {
    let phrase = match code {
        CONTINUE => "Continue",
        SWITCHING_PROTOCOLS => "Switching Protocols",
        PROCESSING => "Processing",
        OK => "OK",
        CREATED => "Created",
        ACCEPTED => "Accepted",
        NON_AUTHORITATIVE_INFORMATION => "Non Authoritative Information",
        NO_CONTENT => "No Content",
        RESET_CONTENT => "Reset Content",
        PARTIAL_CONTENT => "Partial Content",
        MULTI_STATUS => "Multi-Status",
        MULTIPLE_CHOICES => "Multiple Choices",
        MOVED_PERMANENTLY => "Moved Permanently",
        MOVED_TEMPORARILY => "Moved Temporarily",
        SEE_OTHER => "See Other",
        NOT_MODIFIED => "Not Modified",
        USE_PROXY => "Use Proxy",
        TEMPORARY_REDIRECT => "Temporary Redirect",
        BAD_REQUEST => "Bad Request",
        UNAUTHORIZED => "Unauthorized",
        PAYMENT_REQUIRED => "Payment Required",
        FORBIDDEN => "Forbidden",
        NOT_FOUND => "Not Found",
        METHOD_NOT_ALLOWED => "Method Not Allowed",
        NOT_ACCEPTABLE => "Not Acceptable",
        PROXY_AUTHENTICATION_REQUIRED => "Proxy Authentication Required",
        REQUEST_TIMEOUT => "Request Timeout",
        CONFLICT => "Conflict",
        GONE => "Gone",
        LENGTH_REQUIRED => "Length Required",
        PRECONDITION_FAILED => "Precondition Failed",
        REQUEST_TOO_LONG => "Request Too Long",
        REQUEST_URI_TOO_LONG => "Request-URI Too Long",
        UNSUPPORTED_MEDIA_TYPE => "Unsupported Media Type",
        REQUESTED_RANGE_NOT_SATISFIABLE => "Requested Range Not Satisfiable",
        EXPECTATION_FAILED => "Expectation Failed",
        INSUFFICIENT_SPACE_ON_RESOURCE => "Insufficient Space On Resource",
        METHOD_FAILURE => "Method Failure",
        UNPROCESSABLE_ENTITY => "Unprocessable Entity",
        LOCKED => "Locked",
        FAILED_DEPENDENCY => "Failed Dependency",
        INTERNAL_SERVER_ERROR => "Internal Server Error",
        NOT_IMPLEMENTED => "Not Implemented",
        BAD_GATEWAY => "Bad Gateway",
        SERVICE_UNAVAILABLE => "Service Unavailable",
        GATEWAY_TIMEOUT => "Gateway Timeout",
        HTTP_VERSION_NOT_SUPPORTED => "Http Version Not Supported",
        INSUFFICIENT_STORAGE => "Insufficient Storage",
        _ => return None,
    };
    Some(phrase)
}
