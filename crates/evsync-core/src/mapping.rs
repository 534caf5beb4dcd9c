// Attribute mapping between display labels and canonical field names
//
// The association list is fixed at build time and ordered: exports emit
// fields in exactly this order. The same table drives both the pull-side
// display projection and the push-side CSV column lookup, so the two can
// never drift apart.

use serde_json::{Map, Value};

use crate::coerce::display_date;
use crate::sanitize::sanitize_trim;

/// Declared broker attribute type for a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeType {
    Number,
    DateTime,
    Text,
}

impl AttributeType {
    /// NGSI-v2 attribute type string
    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeType::Number => "Number",
            AttributeType::DateTime => "DateTime",
            AttributeType::Text => "Text",
        }
    }
}

/// One entry of the attribute table.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// Human-readable label used in CSV columns and export keys
    pub label: &'static str,

    /// Canonical broker attribute name
    pub name: &'static str,

    /// Declared type, applied by the push-side coercer
    pub ty: AttributeType,

    /// Render as a bare `YYYY-MM-DD` date in display output
    pub date_display: bool,

    /// Included in push payloads built from CSV rows. Fields outside the
    /// source CSV (and `updated_at`, which is stamped with the run time)
    /// stay out of the payload.
    pub pushed: bool,
}

const fn field(
    label: &'static str,
    name: &'static str,
    ty: AttributeType,
    date_display: bool,
    pushed: bool,
) -> FieldSpec {
    FieldSpec {
        label,
        name,
        ty,
        date_display,
        pushed,
    }
}

/// CSV column and display label of the event identity field.
pub const EVENT_NO_LABEL: &str = "NO";

/// CSV column labels of the event interval, parsed ahead of filtering.
pub const START_DATE_LABEL: &str = "開始日";
pub const END_DATE_LABEL: &str = "終了日";

/// Prefix concatenated with the numeric event id to form the entity id.
pub const ENTITY_ID_PREFIX: &str = "Event_";

/// Entity type of every record this pipeline touches.
pub const ENTITY_TYPE: &str = "Event";

use AttributeType::{DateTime, Number, Text};

/// The full ordered attribute table.
pub const FIELDS: &[FieldSpec] = &[
    field("都道府県コード又は市区町村コード", "prefecture_code", Number, false, true),
    field("NO", "event_no", Number, false, true),
    field("都道府県名", "prefecture_name", Text, false, true),
    field("市区町村名", "city_name", Text, false, true),
    field("イベント名", "event_name", Text, false, true),
    field("イベント名_カナ", "event_name_kana", Text, false, true),
    field("イベント名_英語", "event_name_english", Text, false, false),
    field("開始日", "start_date", DateTime, true, true),
    field("終了日", "end_date", DateTime, true, true),
    field("開始時間", "start_time", Text, false, true),
    field("終了時間", "end_time", Text, false, true),
    field("開始日時特記事項", "start_date_note", Text, false, false),
    field("説明", "description", Text, false, true),
    field("料金(基本)", "basic_fee", Number, false, true),
    field("料金(詳細)", "detailed_fee", Text, false, true),
    field("連絡先名称", "contact_name", Text, false, true),
    field("連絡先電話番号", "contact_phone", Text, false, true),
    field("連絡先内線番号", "contact_extension", Text, false, true),
    field("主催者", "organizer", Text, false, true),
    field("場所名称", "location_name", Text, false, true),
    field("住所", "address", Text, false, true),
    field("方書", "address_note", Text, false, true),
    field("緯度", "latitude", Number, false, true),
    field("経度", "longitude", Number, false, true),
    field("アクセス方法", "access_info", Text, false, true),
    field("駐車場情報", "parking_info", Text, false, true),
    field("定員", "capacity", Number, false, true),
    field("参加申込終了日", "registration_end_date", DateTime, true, true),
    field("参加申込終了時間", "registration_end_time", Text, false, true),
    field("参加申込方法", "registration_method", Text, false, true),
    field("URL", "URL", Text, false, false),
    field("備考", "note", Text, false, false),
    field("カテゴリー", "category", Text, false, true),
    field("区", "ward", Text, false, true),
    field("公開日", "published_date", DateTime, true, true),
    field("更新日", "updated_at", DateTime, true, false),
    field("子育て情報", "child_info", Text, false, true),
    field("施設No.", "facility_no", Text, false, true),
];

/// Look up a field by its canonical name.
pub fn field_by_name(name: &str) -> Option<&'static FieldSpec> {
    FIELDS.iter().find(|f| f.name == name)
}

/// Project a keyValues entity onto the display labels, in table order.
///
/// Every mapped field appears in the output; canonical fields missing
/// from the entity come through as `null`. Unmapped entity attributes
/// are ignored. String values pass through the pull-side (trim-only)
/// sanitizer, and date-display fields are reduced to bare dates.
pub fn to_display(entity: &Map<String, Value>) -> Map<String, Value> {
    let mut display = Map::with_capacity(FIELDS.len());
    for spec in FIELDS {
        let value = entity.get(spec.name).and_then(|raw| {
            let sanitized = match raw {
                Value::String(s) => Value::String(sanitize_trim(s)?),
                other => other.clone(),
            };
            if spec.date_display {
                display_date(&sanitized)
            } else {
                Some(sanitized)
            }
        });
        display.insert(spec.label.to_string(), value.unwrap_or(Value::Null));
    }
    display
}
