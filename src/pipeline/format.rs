//! Message formatting.
//!
//! The labels and line order below are read by people and by anything that
//! scrapes the channel, so they are kept stable.

use crate::pipeline::types::{MAX_RATING, ReviewRow};

const FILLED_STAR: char = '★';
const EMPTY_STAR: char = '☆';

/// `rating` filled stars followed by `5 - rating` empty stars.
///
/// Ratings above 5 are clamped.
pub fn star_string(rating: u8) -> String {
    let filled = rating.min(MAX_RATING) as usize;
    let mut stars = String::with_capacity(MAX_RATING as usize * FILLED_STAR.len_utf8());
    stars.extend(std::iter::repeat_n(FILLED_STAR, filled));
    stars.extend(std::iter::repeat_n(EMPTY_STAR, MAX_RATING as usize - filled));
    stars
}

/// Render one review.
///
/// Without a URL only the rating block is sent; with one, the title, text
/// and URL are included as well.
#[allow(clippy::too_many_arguments)]
pub fn format_message(
    title: &str,
    text: &str,
    submitted_at: &str,
    rating: u8,
    device: &str,
    version: &str,
    url: &str,
    app_name: &str,
) -> String {
    let stars = star_string(rating);

    if url.is_empty() {
        return format!(
            "Application: {app_name}\nRating: {stars}\nSubmitted at: {submitted_at}\nDevice: {device}\nVersion: {version}\n"
        );
    }

    format!(
        "Application: {app_name}\nRating: {stars}\nText: {title} {text}\nSubmitted at: {submitted_at}\nDevice: {device}\nVersion: {version}\nURL: {url}"
    )
}

impl ReviewRow {
    /// Render this review with [`format_message`].
    pub fn to_message(&self) -> String {
        format_message(
            &self.title,
            &self.text,
            &self.submitted_at,
            self.rating,
            &self.device,
            &self.version,
            &self.url,
            &self.app_name,
        )
    }
}
