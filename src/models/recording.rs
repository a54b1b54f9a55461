//! Recording models

use serde::Deserialize;

use super::flex;
use super::live::ReturnCode;

/// Thumbnail of a recording playback.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PreviewImage {
    pub url: String,
    pub alt: Option<String>,
    #[serde(default, deserialize_with = "flex::u32_or_zero")]
    pub width: u32,
    #[serde(default, deserialize_with = "flex::u32_or_zero")]
    pub height: u32,
}

/// One playback format of a recording.
#[derive(Debug, Clone, Deserialize)]
pub struct Playback {
    #[serde(rename = "type", default)]
    pub format: String,
    #[serde(default)]
    pub url: String,
    /// Length in minutes.
    #[serde(default, deserialize_with = "flex::u32_or_zero")]
    pub length: u32,
    #[serde(default)]
    pub preview: Vec<PreviewImage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recording {
    #[serde(rename = "recordID")]
    pub record_id: String,
    #[serde(rename = "meetingID", default)]
    pub meeting_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "flex::bool_or_false")]
    pub published: bool,
    #[serde(default, deserialize_with = "flex::bool_or_false")]
    pub protected: bool,
    #[serde(default, deserialize_with = "flex::opt_i64")]
    pub start_time: Option<i64>,
    #[serde(default, deserialize_with = "flex::opt_i64")]
    pub end_time: Option<i64>,
    pub owner_id: Option<String>,
    #[serde(default)]
    pub playback: Vec<Playback>,
}

/// Response of `getRecordings.json` / `getSiteRecordings.json`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingList {
    #[serde(default)]
    pub returncode: ReturnCode,
    pub message_key: Option<String>,
    /// `None` when the server could not list recordings at all.
    pub recordings: Option<Vec<Recording>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_recording_list() {
        let json = r#"{
            "returncode": "SUCCESS",
            "recordings": [{
                "recordID": "r-1",
                "meetingID": "m-1",
                "name": "Lecture 1",
                "published": "true",
                "protected": false,
                "startTime": "1700000000000",
                "ownerId": "u-1",
                "playback": [
                    {"type": "presentation", "url": "https://x/p", "length": "42",
                     "preview": [{"url": "https://x/1.png", "width": "176", "height": "136"}]},
                    {"type": "video", "url": "https://x/v"}
                ]
            }]
        }"#;
        let list: RecordingList = serde_json::from_str(json).unwrap();
        let recs = list.recordings.unwrap();
        assert_eq!(recs.len(), 1);
        let r = &recs[0];
        assert!(r.published);
        assert!(!r.protected);
        assert_eq!(r.start_time, Some(1_700_000_000_000));
        assert_eq!(r.playback[0].length, 42);
        assert_eq!(r.playback[0].preview[0].width, 176);
        assert!(r.playback[1].preview.is_empty());
    }

    #[test]
    fn test_missing_recordings_is_none() {
        let list: RecordingList =
            serde_json::from_str(r#"{"returncode":"FAILED","messageKey":"noRecordings"}"#)
                .unwrap();
        assert!(list.recordings.is_none());
    }
}
