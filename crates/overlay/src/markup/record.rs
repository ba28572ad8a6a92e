//! The flat persisted record for one markup.
//!
//! Field names follow the viewer-facing attribute names (camelCase) so an
//! export is readable next to the host's own markup dumps. Points and colors
//! serialize as plain component arrays; the text is percent-encoded so any
//! user string survives embedding in JSON untouched.

use super::{Markup, MarkupConfig, MarkupId, MarkupStyle};
use glam::{Vec2, Vec3};
use modelmark_core::{BoxRenderer, Color, GeometryAdapter};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced while decoding a persisted record.
#[derive(Debug, Error)]
pub enum RecordError {
    /// The percent-encoded text was malformed.
    #[error("invalid percent encoding in markup text: {0}")]
    InvalidEncoding(String),
    /// The record could not be parsed from JSON.
    #[error("failed to parse markup record: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Serializable snapshot of one markup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkupRecord {
    /// Unique markup id.
    pub id: MarkupId,
    /// Font family.
    pub font: String,
    /// Font size in pixels.
    pub font_size: f32,
    /// Box background color components.
    pub background_color: [u8; 3],
    /// Anchor dot color components.
    pub circle_color: [u8; 3],
    /// Anchor dot radius.
    pub circle_radius: f32,
    /// Anchor point coordinates.
    pub anchor_point: [f32; 3],
    /// Box point coordinates.
    pub box_point: [f32; 3],
    /// Viewport-relative box position.
    pub box_point_relative: [f32; 2],
    /// Maximum box width.
    pub max_width: f32,
    /// Whether the box follows a viewport-relative fraction.
    pub fixed: bool,
    /// Whether the markup participates in visibility testing.
    pub check_visibility: bool,
    /// Whether a leader line is drawn.
    pub show_leader_line: bool,
    /// Whether the markup carries a pin marker.
    pub has_pin: bool,
    /// Whether the anchor point may be dragged.
    pub allow_anchor_move: bool,
    /// Whether the box point may be dragged.
    pub allow_box_move: bool,
    /// Whether text editing is allowed.
    pub allow_editing: bool,
    /// Percent-encoded note text.
    pub text: String,
    /// Opaque pass-through payload.
    #[serde(default)]
    pub user_data: Option<serde_json::Value>,
}

impl Markup {
    /// Snapshot this markup into a persistable record.
    pub fn to_record(&self) -> MarkupRecord {
        let style = self.style();
        MarkupRecord {
            id: self.id(),
            font: style.font.clone(),
            font_size: style.font_size,
            background_color: style.background_color.to_array(),
            circle_color: style.circle_color.to_array(),
            circle_radius: style.circle_radius,
            anchor_point: self.anchor_point().to_array(),
            box_point: self.box_point().to_array(),
            box_point_relative: self.box_point_relative().to_array(),
            max_width: style.max_width,
            fixed: self.fixed(),
            check_visibility: self.check_visibility(),
            show_leader_line: self.show_leader_line(),
            has_pin: self.has_pin(),
            allow_anchor_move: self.allow_anchor_move(),
            allow_box_move: self.allow_box_move(),
            allow_editing: self.allow_editing(),
            text: percent_encode(self.text()),
            user_data: self.user_data().cloned(),
        }
    }

    /// Rebuild a markup from a persisted record.
    ///
    /// The rebuilt markup is always deselected. The record's permission
    /// flags are restored as-is; the read-only forcing for loaded markups is
    /// host-imposed and happens in the collection load path.
    pub fn from_record(
        record: &MarkupRecord,
        renderer: Box<dyn BoxRenderer>,
        adapter: &dyn GeometryAdapter,
    ) -> Result<Self, RecordError> {
        let text = percent_decode(&record.text)?;
        let config = MarkupConfig {
            id: Some(record.id),
            box_point: Some(Vec3::from_array(record.box_point)),
            box_point_relative: Some(Vec2::from_array(record.box_point_relative)),
            text,
            style: MarkupStyle {
                font: record.font.clone(),
                font_size: record.font_size,
                background_color: Color::from_array(record.background_color),
                circle_color: Color::from_array(record.circle_color),
                circle_radius: record.circle_radius,
                max_width: record.max_width,
            },
            fixed: record.fixed,
            check_visibility: record.check_visibility,
            show_leader_line: record.show_leader_line,
            has_pin: record.has_pin,
            allow_anchor_move: record.allow_anchor_move,
            allow_box_move: record.allow_box_move,
            user_data: record.user_data.clone(),
        };

        let mut markup = Markup::new(Vec3::from_array(record.anchor_point), config, renderer, adapter);
        markup.set_allow_editing(record.allow_editing);
        markup.deselect();
        Ok(markup)
    }
}

// The encodeURIComponent unreserved set.
fn is_unreserved(byte: u8) -> bool {
    byte.is_ascii_alphanumeric()
        || matches!(
            byte,
            b'-' | b'_' | b'.' | b'!' | b'~' | b'*' | b'\'' | b'(' | b')'
        )
}

/// Percent-encode arbitrary text for safe embedding in a record.
pub fn percent_encode(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for &byte in text.as_bytes() {
        if is_unreserved(byte) {
            out.push(byte as char);
        } else {
            out.push('%');
            out.push_str(&format!("{byte:02X}"));
        }
    }
    out
}

/// Decode percent-encoded record text.
pub fn percent_decode(text: &str) -> Result<String, RecordError> {
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = bytes
                .get(i + 1..i + 3)
                .and_then(|pair| std::str::from_utf8(pair).ok())
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .ok_or_else(|| RecordError::InvalidEncoding(text.to_string()))?;
            out.push(hex);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).map_err(|_| RecordError::InvalidEncoding(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use modelmark_testkit::{FakeGeometryAdapter, RecordingBox};

    #[test]
    fn percent_codec_round_trips_plain_ascii() {
        assert_eq!(percent_encode("note-1"), "note-1");
        assert_eq!(percent_decode("note-1").unwrap(), "note-1");
    }

    #[test]
    fn percent_codec_escapes_reserved_and_unicode() {
        let text = "flange Ø12 / torque: 8 N·m\n\"checked\"";
        let encoded = percent_encode(text);
        assert!(!encoded.contains(' '));
        assert!(!encoded.contains('"'));
        assert!(!encoded.contains('\n'));
        assert!(encoded.is_ascii());
        assert_eq!(percent_decode(&encoded).unwrap(), text);
    }

    #[test]
    fn percent_decode_rejects_truncated_escape() {
        assert!(percent_decode("abc%2").is_err());
        assert!(percent_decode("abc%zz").is_err());
    }

    #[test]
    fn record_round_trip_preserves_fields_and_forces_deselection() {
        let adapter = FakeGeometryAdapter::new();
        let mut markup = Markup::new(
            Vec3::new(1.0, 2.0, 3.0),
            MarkupConfig {
                box_point: Some(Vec3::new(4.0, 5.0, 6.0)),
                text: "inspect weld seam".to_string(),
                fixed: true,
                check_visibility: true,
                has_pin: true,
                allow_box_move: false,
                user_data: Some(serde_json::json!({ "ticket": 41 })),
                ..MarkupConfig::default()
            },
            Box::new(RecordingBox::new(Vec2::new(100.0, 30.0))),
            &adapter,
        );
        markup.select();

        let record = markup.to_record();
        let restored = Markup::from_record(
            &record,
            Box::new(RecordingBox::new(Vec2::new(100.0, 30.0))),
            &adapter,
        )
        .unwrap();

        assert_eq!(restored.id(), markup.id());
        assert_eq!(restored.anchor_point(), markup.anchor_point());
        assert_eq!(restored.box_point(), markup.box_point());
        assert_eq!(restored.box_point_relative(), markup.box_point_relative());
        assert_eq!(restored.text(), markup.text());
        assert_eq!(restored.fixed(), markup.fixed());
        assert_eq!(restored.check_visibility(), markup.check_visibility());
        assert_eq!(restored.has_pin(), markup.has_pin());
        assert_eq!(restored.allow_box_move(), markup.allow_box_move());
        assert_eq!(restored.style(), markup.style());
        assert_eq!(restored.user_data(), markup.user_data());
        assert!(!restored.selected());
    }

    #[test]
    fn record_serializes_with_viewer_facing_field_names() {
        let adapter = FakeGeometryAdapter::new();
        let markup = Markup::new(
            Vec3::ZERO,
            MarkupConfig::default(),
            Box::new(RecordingBox::new(Vec2::new(100.0, 30.0))),
            &adapter,
        );

        let json = serde_json::to_value(markup.to_record()).unwrap();
        assert!(json.get("anchorPoint").is_some());
        assert!(json.get("boxPointRelative").is_some());
        assert!(json.get("showLeaderLine").is_some());
        assert!(json.get("anchor_point").is_none());
    }
}
