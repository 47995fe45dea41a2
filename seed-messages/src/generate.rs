//! Generate MessageRecord seed history from the embedded samples.

use anyhow::{anyhow, ensure, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use storage::MessageRecord;

/// Embedded sample texts, image URLs and the remote author.
const SAMPLES_JSON: &str = include_str!("samples.json");

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Samples {
    pub texts: Vec<String>,
    pub image_refs: Vec<String>,
    pub author_id: String,
    pub author_display_name: String,
}

pub fn load_samples() -> Result<Samples> {
    let samples: Samples = serde_json::from_str(SAMPLES_JSON)?;
    ensure!(!samples.texts.is_empty(), "samples.json has no texts");
    ensure!(!samples.image_refs.is_empty(), "samples.json has no image refs");
    Ok(samples)
}

/// Generates `count` messages one hour apart, oldest first, the last one hour before `now`.
///
/// Structure is deterministic: texts cycle through the samples, every 5th
/// message carries an image, and message `i` comes from the remote author when
/// `i % 3 == 0`. Only the ids (fresh UUIDs) vary between runs.
///
/// Fails if `count` hours before `now` is not a representable time.
pub fn generate_messages(count: usize, now: DateTime<Utc>) -> Result<Vec<MessageRecord>> {
    let samples = load_samples()?;

    let base_time = i64::try_from(count)
        .ok()
        .and_then(Duration::try_hours)
        .and_then(|span| now.checked_sub_signed(span))
        .ok_or_else(|| anyhow!("cannot seed {} hourly messages before {}", count, now))?;
    let mut out = Vec::with_capacity(count);
    for i in 0..count {
        let text = samples.texts[i % samples.texts.len()].clone();
        let timestamp = base_time + Duration::hours(i as i64);

        let record = if i % 3 == 0 {
            MessageRecord::incoming(
                Some(text),
                samples.author_id.clone(),
                samples.author_display_name.clone(),
            )
        } else {
            MessageRecord::outgoing(text)
        };
        let record = record.with_timestamp(timestamp);
        let record = if i % 5 == 0 {
            record.with_image(samples.image_refs[i % samples.image_refs.len()].clone())
        } else {
            record
        };
        out.push(record);
    }
    Ok(out)
}
