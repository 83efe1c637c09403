//! Who may see a review.
//!
//! Active reviews are public. An inactive review stays visible to its
//! author on the detail page only; every listing shows active reviews
//! alone, the author's own listings included.

use reviewboard_db::entities::review;

/// Whether `viewer_id` may open `review` directly.
#[must_use]
pub fn can_view(review: &review::Model, viewer_id: Option<&str>) -> bool {
    review.is_active || viewer_id.is_some_and(|id| id == review.user_id)
}
