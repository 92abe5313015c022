
use std::fmt::Write;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc, Weekday};

use super::MealMenu;

/// Asia/Seoul has been UTC+9 without daylight saving since 1988.
const SEOUL_UTC_OFFSET_HOURS: i64 = 9;

pub fn seoul_today() -> NaiveDate {
    seoul_date(Utc::now())
}

pub fn seoul_date(now: DateTime<Utc>) -> NaiveDate {
    (now + Duration::hours(SEOUL_UTC_OFFSET_HOURS)).date_naive()
}

/// `6월 10일`
pub fn day_label(date: NaiveDate) -> String {
    format!("{}월 {}일", date.month(), date.day())
}

/// Slack style plain text for the lunch served on `date`.
pub fn format_menu(menu: &MealMenu, date: NaiveDate) -> String {
    if menu.is_empty() {
        return fallback_message(date, date.weekday());
    }

    let mut out = format!("오늘({})의 점심 메뉴입니다:", day_label(date));
    for (corner, item) in menu.iter() {
        // writing into a String never fails
        let _ = match &item.side {
            Some(side) => write!(out, "\n{corner}: {} - 반찬: {side}", item.name),
            None => write!(out, "\n{corner}: {}", item.name),
        };
    }
    out
}

/// Text for a day without any menu.
pub fn fallback_message(date: NaiveDate, weekday: Weekday) -> String {
    let day = day_label(date);
    match weekday {
        Weekday::Sat | Weekday::Sun =>
            format!("오늘({day})은 주말이라 점심 메뉴가 없습니다."),
        Weekday::Mon => format!(
            "오늘({day})의 메뉴 정보가 없습니다. \
            월요일에는 메뉴 정보 업데이트가 늦어질 수 있습니다."
        ),
        _ => format!(
            "오늘({day})의 메뉴 정보가 없습니다. \
            아직 메뉴 정보가 업데이트 되지 않았을 수 있습니다."
        ),
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::MenuItem;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn menu_lines_per_corner() {
        let mut menu = MealMenu::default();
        menu.insert("한식".into(), MenuItem { name: "비빔밥".into(), side: Some("나물".into()) });
        menu.insert("양식".into(), MenuItem { name: "파스타".into(), side: None });

        let text = format_menu(&menu, date(2024, 6, 10));
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines[0], "오늘(6월 10일)의 점심 메뉴입니다:");
        assert!(lines.contains(&"한식: 비빔밥 - 반찬: 나물"));
        assert!(lines.contains(&"양식: 파스타"));
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn fallback_depends_on_weekday() {
        let saturday = date(2024, 6, 15);
        let monday = date(2024, 6, 10);
        let wednesday = date(2024, 6, 12);
        let empty = MealMenu::default();

        let weekend = format_menu(&empty, saturday);
        let lagging = format_menu(&empty, monday);
        let generic = format_menu(&empty, wednesday);

        assert!(weekend.contains("주말"));
        assert!(lagging.contains("월요일"));
        assert!(generic.contains("아직"));
        assert_ne!(weekend, lagging);
        assert_ne!(lagging, generic);
        assert_ne!(weekend, generic);
    }

    #[test]
    fn sunday_is_weekend_and_other_weekdays_are_generic() {
        let d = date(2024, 6, 12);
        assert_eq!(fallback_message(d, Weekday::Sun), fallback_message(d, Weekday::Sat));
        for w in [Weekday::Tue, Weekday::Wed, Weekday::Thu, Weekday::Fri] {
            assert_eq!(fallback_message(d, w), fallback_message(d, Weekday::Wed));
        }
        assert_ne!(fallback_message(d, Weekday::Mon), fallback_message(d, Weekday::Tue));
    }

    #[test]
    fn seoul_date_is_nine_hours_ahead() {
        // 2024-06-09 15:30 UTC is already monday morning in Seoul
        let now = Utc.with_ymd_and_hms(2024, 6, 9, 15, 30, 0).unwrap();
        assert_eq!(seoul_date(now), date(2024, 6, 10));

        let now = Utc.with_ymd_and_hms(2024, 6, 9, 14, 59, 59).unwrap();
        assert_eq!(seoul_date(now), date(2024, 6, 9));
    }
}
