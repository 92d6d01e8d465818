pub mod headercodec;
pub mod orderedheaders;
pub mod reason;
pub mod requestbody;
pub mod response;
pub mod responsebody;
pub mod retry;
pub mod transaction;

// Re-exports for convenience
pub use orderedheaders::HeaderList;
pub use reason::{reason_phrase, UNASSIGNED_REASON_PHRASE};
pub use requestbody::RequestData;
pub use response::{Response, ResponseParts};
pub use responsebody::{BodyStream, ResponseBody};
pub use retry::{HeaderRetention, RetryConfig};
