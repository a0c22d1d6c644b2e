//! Rendering of a scraped map place into the fixed report sent to the model
//! and shown to the user.

use serde_json::Value;

fn str_field<'a>(place: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|k| place.get(*k).and_then(Value::as_str))
}

fn num_field(place: &Value, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|k| place.get(*k).and_then(Value::as_f64))
}

/// Render opening hours, which arrive in several shapes: a list of
/// `{day, hours}` objects, a list of strings, or a single string.
fn format_hours(hours: &Value) -> Option<String> {
    match hours {
        Value::Array(items) if !items.is_empty() => {
            let mut lines = Vec::new();
            for item in items {
                match item {
                    Value::Object(_) => {
                        if let (Some(day), Some(h)) = (
                            item.get("day").and_then(Value::as_str),
                            item.get("hours").and_then(Value::as_str),
                        ) {
                            lines.push(format!("{day}: {h}"));
                        }
                    }
                    Value::String(s) => lines.push(s.clone()),
                    _ => {}
                }
            }
            if lines.is_empty() {
                None
            } else {
                Some(lines.join("\n"))
            }
        }
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

/// Build the place report. Lines appear in a fixed order and absent fields
/// are omitted entirely rather than rendered blank.
pub fn format_place(place: &Value) -> String {
    let mut lines = Vec::new();

    let name = str_field(place, &["title", "name"]).unwrap_or("未知地點");
    lines.push(format!("📍 {name}"));

    if let Some(category) = str_field(place, &["categoryName"]) {
        lines.push(format!("🏷️ 類型：{category}"));
    }
    if let Some(address) = str_field(place, &["address"]) {
        lines.push(format!("📮 地址：{address}"));
    }
    if let Some(score) = num_field(place, &["totalScore", "rating"]) {
        let reviews = num_field(place, &["reviewsCount", "reviews"])
            .map(|n| n as u64)
            .unwrap_or(0);
        lines.push(format!("⭐ 評分：{score}（{reviews} 則評論）"));
    }
    if let Some(phone) = str_field(place, &["phone"]) {
        lines.push(format!("📞 電話：{phone}"));
    }
    if let Some(website) = str_field(place, &["website"]) {
        lines.push(format!("🌐 網站：{website}"));
    }
    if let Some(price) = str_field(place, &["price"]) {
        lines.push(format!("💰 價位：{price}"));
    }
    if let Some(hours) = place.get("openingHours").and_then(format_hours) {
        lines.push(format!("🕐 營業時間：\n{hours}"));
    }
    if let Some(location) = place.get("location") {
        if let (Some(lat), Some(lng)) = (
            location.get("lat").and_then(Value::as_f64),
            location.get("lng").and_then(Value::as_f64),
        ) {
            lines.push(format!("🗺️ 座標：{lat}, {lng}"));
        }
    }
    if let Some(description) = str_field(place, &["description"]) {
        lines.push(format!("📝 簡介：{description}"));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_full_place() {
        let place = json!({
            "title": "鼎泰豐 信義店",
            "categoryName": "餐廳",
            "address": "台北市信義區",
            "totalScore": 4.5,
            "reviewsCount": 1200,
            "phone": "+886-2-1234-5678",
            "website": "https://example.com",
            "price": "$$",
            "location": { "lat": 25.033, "lng": 121.565 },
            "description": "小籠包名店"
        });
        let report = format_place(&place);
        assert!(report.starts_with("📍 鼎泰豐 信義店"));
        assert!(report.contains("🏷️ 類型：餐廳"));
        assert!(report.contains("⭐ 評分：4.5（1200 則評論）"));
        assert!(report.contains("🗺️ 座標：25.033, 121.565"));
        assert!(report.contains("📝 簡介：小籠包名店"));
    }

    #[test]
    fn test_name_fallback_order() {
        let place = json!({ "name": "只有 name 欄位" });
        assert!(format_place(&place).starts_with("📍 只有 name 欄位"));

        let both = json!({ "title": "title 優先", "name": "忽略" });
        assert!(format_place(&both).starts_with("📍 title 優先"));
    }

    #[test]
    fn test_unknown_place_name() {
        assert_eq!(format_place(&json!({})), "📍 未知地點");
    }

    #[test]
    fn test_absent_fields_omitted() {
        let place = json!({ "title": "某處", "address": "某地址" });
        let report = format_place(&place);
        assert!(report.contains("📮 地址：某地址"));
        assert!(!report.contains("電話"));
        assert!(!report.contains("評分"));
    }

    #[test]
    fn test_rating_alias() {
        let place = json!({ "title": "某處", "rating": 3.8, "reviews": 10 });
        assert!(format_place(&place).contains("⭐ 評分：3.8（10 則評論）"));
    }

    #[test]
    fn test_hours_object_list() {
        let place = json!({
            "title": "某店",
            "openingHours": [
                { "day": "星期一", "hours": "11:00–21:00" },
                { "day": "星期二", "hours": "休息" }
            ]
        });
        let report = format_place(&place);
        assert!(report.contains("🕐 營業時間：\n星期一: 11:00–21:00\n星期二: 休息"));
    }

    #[test]
    fn test_hours_string_forms() {
        let list = json!({ "title": "a", "openingHours": ["每日 10:00–20:00"] });
        assert!(format_place(&list).contains("每日 10:00–20:00"));

        let single = json!({ "title": "a", "openingHours": "週一公休" });
        assert!(format_place(&single).contains("🕐 營業時間：\n週一公休"));
    }

    #[test]
    fn test_empty_hours_omitted() {
        let place = json!({ "title": "a", "openingHours": [] });
        assert!(!format_place(&place).contains("營業時間"));
    }
}
