use tracing::{info, warn};

use nailfeed_types::{Notice, ReportReason};

use crate::error::{FeedError, Result};
use crate::services::Services;

/// Flag a comment for moderation. Leaves any held comment state untouched.
pub async fn report_comment(
    services: &Services,
    post_id: &str,
    comment_id: u64,
    reason: ReportReason,
    content: &str,
) -> Result<()> {
    if !services.session.is_authenticated() {
        services.notifier.notify(Notice::login_required("report comments"));
        return Err(FeedError::AuthenticationRequired);
    }

    match services
        .comments
        .report_comment_abuse(post_id, comment_id, reason, content)
        .await
    {
        Ok(()) => {
            info!("Reported comment {} on {} ({:?})", comment_id, post_id, reason);
            services
                .notifier
                .notify(Notice::success("Thanks, the comment was reported"));
            Ok(())
        }
        Err(e) => {
            warn!("Reporting comment {} failed: {}", comment_id, e);
            services
                .notifier
                .notify(Notice::error(format!("Could not report the comment. {}", e.user_message())));
            Err(e)
        }
    }
}
