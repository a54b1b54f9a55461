//! Ownership-gated access to recordings

use crate::models::{Playback, PreviewImage, Recording};

use super::Permissions;

/// Playback format every viewer may see when format filtering is on.
pub const BASIC_FORMAT: &str = "presentation";

/// What the current user may do with one recording.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordingAccess {
    pub can_edit: bool,
    pub can_delete: bool,
    pub can_view_extended_formats: bool,
    /// Largest preview set among the playbacks.
    pub images: Vec<PreviewImage>,
}

impl RecordingAccess {
    pub fn resolve(recording: &Recording, user_id: &str, perms: &Permissions) -> Self {
        let is_owner = recording.owner_id.as_deref() == Some(user_id);

        let (can_edit, can_delete, can_view_extended_formats) = if is_owner {
            (
                perms.bbb_recording_edit_own || perms.bbb_recording_edit_any,
                perms.bbb_recording_delete_own || perms.bbb_recording_delete_any,
                perms.bbb_recording_extended_formats_own
                    || perms.bbb_recording_extended_formats_any,
            )
        } else {
            (
                perms.bbb_recording_edit_any,
                perms.bbb_recording_delete_any,
                perms.bbb_recording_extended_formats_any,
            )
        };

        let mut images: &[PreviewImage] = &[];
        for playback in &recording.playback {
            if playback.preview.len() > images.len() {
                images = &playback.preview;
            }
        }

        Self {
            can_edit,
            can_delete,
            can_view_extended_formats,
            images: images.to_vec(),
        }
    }

    /// Playbacks this user may open. With the site format filter on, only
    /// the basic format is shown unless extended formats are allowed.
    pub fn visible_playbacks<'a>(&self, recording: &'a Recording, filter_enabled: bool) -> Vec<&'a Playback> {
        recording
            .playback
            .iter()
            .filter(|p| !filter_enabled || self.can_view_extended_formats || p.format == BASIC_FORMAT)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn preview(n: u32) -> Vec<PreviewImage> {
        (0..n)
            .map(|i| PreviewImage {
                url: format!("https://img/{}.png", i),
                alt: None,
                width: 176,
                height: 136,
            })
            .collect()
    }

    fn recording(owner: &str) -> Recording {
        Recording {
            record_id: "r-1".into(),
            owner_id: Some(owner.into()),
            playback: vec![
                Playback {
                    format: "presentation".into(),
                    url: String::new(),
                    length: 10,
                    preview: preview(2),
                },
                Playback {
                    format: "podcast".into(),
                    url: String::new(),
                    length: 10,
                    preview: preview(3),
                },
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_owner_uses_own_flags() {
        let perms = Permissions::from_tokens([
            "bbb.recording.edit.own",
            "bbb.recording.delete.own",
            "bbb.recording.extendedformats.own",
        ]);
        let access = RecordingAccess::resolve(&recording("u-1"), "u-1", &perms);
        assert!(access.can_edit && access.can_delete && access.can_view_extended_formats);

        let other = RecordingAccess::resolve(&recording("u-2"), "u-1", &perms);
        assert!(!other.can_edit && !other.can_delete && !other.can_view_extended_formats);
    }

    #[test]
    fn test_any_flags_apply_to_everyone() {
        let perms = Permissions::from_tokens(["bbb.recording.delete.any"]);
        let access = RecordingAccess::resolve(&recording("u-2"), "u-1", &perms);
        assert!(!access.can_edit);
        assert!(access.can_delete);
    }

    #[test]
    fn test_largest_preview_wins() {
        let access =
            RecordingAccess::resolve(&recording("u-1"), "u-1", &Permissions::default());
        assert_eq!(access.images.len(), 3);

        let bare = Recording::default();
        assert!(RecordingAccess::resolve(&bare, "u-1", &Permissions::default())
            .images
            .is_empty());
    }

    #[test]
    fn test_format_filter() {
        let rec = recording("u-2");
        let basic = RecordingAccess::resolve(&rec, "u-1", &Permissions::default());
        let shown: Vec<&str> = basic
            .visible_playbacks(&rec, true)
            .iter()
            .map(|p| p.format.as_str())
            .collect();
        assert_eq!(shown, vec!["presentation"]);
        assert_eq!(basic.visible_playbacks(&rec, false).len(), 2);

        let perms = Permissions::from_tokens(["bbb.recording.extendedformats.any"]);
        let extended = RecordingAccess::resolve(&rec, "u-1", &perms);
        assert_eq!(extended.visible_playbacks(&rec, true).len(), 2);
    }
}
