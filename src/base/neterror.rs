use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::transport::OptionId;
use crate::urlrequest::RequestSpec;

/// Result codes reported by the transport after a transfer.
///
/// Values mirror libcurl's `CURLcode` numbering so a curl-backed transport can
/// hand its raw errno straight through.
#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum TransferCode {
    #[error("No error")]
    Ok,
    #[error("Unsupported protocol")]
    UnsupportedProtocol,
    #[error("Failed initialization")]
    FailedInit,
    #[error("URL using bad/illegal format")]
    UrlMalformat,
    #[error("Could not resolve proxy name")]
    CouldntResolveProxy,
    #[error("Could not resolve hostname")]
    CouldntResolveHost,
    #[error("Could not connect to server")]
    CouldntConnect,
    #[error("Weird server reply")]
    WeirdServerReply,
    #[error("HTTP/2 error")]
    Http2,
    #[error("Server returned nothing")]
    PartialFile,
    #[error("HTTP response code said error")]
    HttpReturnedError,
    #[error("Failed writing received data")]
    WriteError,
    #[error("Failed to open/read local data")]
    ReadError,
    #[error("Out of memory")]
    OutOfMemory,
    #[error("Timeout was reached")]
    OperationTimedOut,
    #[error("Internal error in the HTTP POST")]
    HttpPostError,
    #[error("SSL connect error")]
    SslConnectError,
    #[error("Operation was aborted by an application callback")]
    AbortedByCallback,
    #[error("Number of redirects hit maximum amount")]
    TooManyRedirects,
    #[error("Unknown option")]
    UnknownOption,
    #[error("Server returned nothing (no headers, no data)")]
    GotNothing,
    #[error("Failed sending data to the peer")]
    SendError,
    #[error("Failure when receiving data from the peer")]
    RecvError,
    #[error("Problem with the local SSL certificate")]
    SslCertProblem,
    #[error("Unrecognized or bad HTTP Content or Transfer-Encoding")]
    BadContentEncoding,
    #[error("SSL peer certificate or SSH remote key was not OK")]
    PeerFailedVerification,
    #[error("Problem with the SSL CA cert (path? access rights?)")]
    SslCaCertBadFile,
    #[error("Stream error in the HTTP/2 framing layer")]
    Http2Stream,

    #[error("Unknown transfer error: {0}")]
    Unknown(i32),
}

impl TransferCode {
    pub fn as_i32(&self) -> i32 {
        match self {
            TransferCode::Ok => 0,
            TransferCode::UnsupportedProtocol => 1,
            TransferCode::FailedInit => 2,
            TransferCode::UrlMalformat => 3,
            TransferCode::CouldntResolveProxy => 5,
            TransferCode::CouldntResolveHost => 6,
            TransferCode::CouldntConnect => 7,
            TransferCode::WeirdServerReply => 8,
            TransferCode::Http2 => 16,
            TransferCode::PartialFile => 18,
            TransferCode::HttpReturnedError => 22,
            TransferCode::WriteError => 23,
            TransferCode::ReadError => 26,
            TransferCode::OutOfMemory => 27,
            TransferCode::OperationTimedOut => 28,
            TransferCode::HttpPostError => 34,
            TransferCode::SslConnectError => 35,
            TransferCode::AbortedByCallback => 42,
            TransferCode::TooManyRedirects => 47,
            TransferCode::UnknownOption => 48,
            TransferCode::GotNothing => 52,
            TransferCode::SendError => 55,
            TransferCode::RecvError => 56,
            TransferCode::SslCertProblem => 58,
            TransferCode::BadContentEncoding => 61,
            TransferCode::PeerFailedVerification => 60,
            TransferCode::SslCaCertBadFile => 77,
            TransferCode::Http2Stream => 92,
            TransferCode::Unknown(code) => *code,
        }
    }

    /// Failures where the connection itself could not be established or kept.
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            TransferCode::CouldntResolveProxy
                | TransferCode::CouldntResolveHost
                | TransferCode::CouldntConnect
                | TransferCode::OperationTimedOut
                | TransferCode::SslConnectError
        )
    }

    /// The only class of failure the executor retries.
    pub fn is_timeout(&self) -> bool {
        matches!(self, TransferCode::OperationTimedOut)
    }
}

impl From<i32> for TransferCode {
    fn from(code: i32) -> Self {
        match code {
            0 => TransferCode::Ok,
            1 => TransferCode::UnsupportedProtocol,
            2 => TransferCode::FailedInit,
            3 => TransferCode::UrlMalformat,
            5 => TransferCode::CouldntResolveProxy,
            6 => TransferCode::CouldntResolveHost,
            7 => TransferCode::CouldntConnect,
            8 => TransferCode::WeirdServerReply,
            16 => TransferCode::Http2,
            18 => TransferCode::PartialFile,
            22 => TransferCode::HttpReturnedError,
            23 => TransferCode::WriteError,
            26 => TransferCode::ReadError,
            27 => TransferCode::OutOfMemory,
            28 => TransferCode::OperationTimedOut,
            34 => TransferCode::HttpPostError,
            35 => TransferCode::SslConnectError,
            42 => TransferCode::AbortedByCallback,
            47 => TransferCode::TooManyRedirects,
            48 => TransferCode::UnknownOption,
            52 => TransferCode::GotNothing,
            55 => TransferCode::SendError,
            56 => TransferCode::RecvError,
            58 => TransferCode::SslCertProblem,
            60 => TransferCode::PeerFailedVerification,
            61 => TransferCode::BadContentEncoding,
            77 => TransferCode::SslCaCertBadFile,
            92 => TransferCode::Http2Stream,
            _ => TransferCode::Unknown(code),
        }
    }
}

/// Caller mistakes detected before any network activity.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid URL {0}")]
    InvalidUrl(String),
    #[error("No URL defined")]
    NoUrl,
    #[error("Invalid method {0}")]
    InvalidMethod(String),
    #[error("Invalid protocol {0} for proxy")]
    InvalidProxyProtocol(String),
    #[error("Invalid data supplied, string or map requested but {0} given")]
    InvalidData(&'static str),
    #[error("{} for cookie file does not exist or is not writable: {source}", .path.display())]
    CookieDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{} is not an existing directory or is not writable: {source}", .path.display())]
    CertificateDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Unsupported transport option {0:?}")]
    UnsupportedOption(OptionId),
}

/// Everything `Client::fetch` and `Response` accessors can fail with.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The connection could not be established or maintained.
    #[error("Network error ({code}): {message}")]
    Network {
        request: Box<RequestSpec>,
        message: String,
        code: TransferCode,
    },

    /// The transfer reached the server stack but failed for another reason.
    #[error("Request error ({code}): {message}")]
    Request {
        request: Box<RequestSpec>,
        message: String,
        code: TransferCode,
    },

    #[error("Stream error: {0}")]
    Stream(String),

    #[cfg(feature = "json")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A response was assembled without one of its required fields.
    #[error("Invalid metadata provided: missing {0}")]
    Metadata(&'static str),
}

impl FetchError {
    /// Classify a failed transfer by its errno.
    pub fn from_transfer(request: &RequestSpec, code: TransferCode, message: String) -> Self {
        let request = Box::new(request.clone());
        if code.is_network() {
            FetchError::Network {
                request,
                message,
                code,
            }
        } else {
            FetchError::Request {
                request,
                message,
                code,
            }
        }
    }

    /// The request that produced this failure, for transfer errors.
    pub fn request(&self) -> Option<&RequestSpec> {
        match self {
            FetchError::Network { request, .. } | FetchError::Request { request, .. } => {
                Some(request)
            }
            _ => None,
        }
    }

    pub fn is_network(&self) -> bool {
        matches!(self, FetchError::Network { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, FetchError::Validation(_))
    }
}
