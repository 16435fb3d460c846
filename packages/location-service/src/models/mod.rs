pub mod errors;
pub mod issue;
pub mod location;
pub mod notification;
pub mod requests;

// Re-export commonly used types
pub use errors::{ErrorCode, ValidationError};
pub use issue::{Issue, IssueCategory, IssueStatus, IssueValidationError, NewIssue};
pub use location::{BoundingBox, Coordinate, GeoError, NormalizedCoordinate};
pub use notification::{Notification, NotificationKind};
pub use requests::{NearbyIssue, NearbyIssuesResponse, ReportIssueRequest, SearchRadius};
