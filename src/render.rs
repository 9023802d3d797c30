use crate::stats::QuakeStats;
use crate::types::{Quake, SortField, SortOrder};
use chrono::NaiveDateTime;
use std::cmp::Ordering;

/// Severity color bucket for a magnitude, as a hex string
pub fn magnitude_color(magnitude: f64) -> &'static str {
    if magnitude >= 7.0 {
        "#DC2626"
    } else if magnitude >= 6.0 {
        "#EA580C"
    } else if magnitude >= 5.0 {
        "#D97706"
    } else if magnitude >= 4.0 {
        "#EAB308"
    } else if magnitude >= 3.0 {
        "#65A30D"
    } else {
        "#16A34A"
    }
}

/// Richter-scale label in Indonesian
pub fn magnitude_label(magnitude: f64) -> &'static str {
    if magnitude < 2.0 {
        "Sangat Kecil"
    } else if magnitude < 3.0 {
        "Kecil"
    } else if magnitude < 4.0 {
        "Ringan"
    } else if magnitude < 5.0 {
        "Sedang"
    } else if magnitude < 6.0 {
        "Kuat"
    } else if magnitude < 7.0 {
        "Besar"
    } else if magnitude < 8.0 {
        "Sangat Besar"
    } else {
        "Dahsyat"
    }
}

/// Intensity description in Indonesian
pub fn intensity_description(magnitude: f64) -> &'static str {
    if magnitude >= 8.0 {
        "Sangat Merusak"
    } else if magnitude >= 7.0 {
        "Merusak Berat"
    } else if magnitude >= 6.0 {
        "Merusak"
    } else if magnitude >= 5.0 {
        "Agak Kuat"
    } else if magnitude >= 4.0 {
        "Sedang"
    } else if magnitude >= 3.0 {
        "Lemah"
    } else {
        "Sangat Lemah"
    }
}

/// Relative age of an event against the given clock, in Indonesian
pub fn format_time_ago(occurred_at: NaiveDateTime, now: NaiveDateTime) -> String {
    let minutes = (now - occurred_at).num_minutes();
    if minutes < 1 {
        return "Baru saja".to_string();
    }
    if minutes < 60 {
        return format!("{} menit yang lalu", minutes);
    }
    let hours = minutes / 60;
    if hours < 24 {
        return format!("{} jam yang lalu", hours);
    }
    format!("{} hari yang lalu", hours / 24)
}

/// Copy-and-sort the record list; normalization itself never reorders, so
/// callers sort at the display edge
pub fn sort_quakes(quakes: &[Quake], field: SortField, order: SortOrder) -> Vec<Quake> {
    let mut sorted = quakes.to_vec();
    sorted.sort_by(|a, b| {
        let comparison = match field {
            SortField::Date => a.occurred_at.cmp(&b.occurred_at),
            SortField::Magnitude => a
                .magnitude
                .partial_cmp(&b.magnitude)
                .unwrap_or(Ordering::Equal),
            SortField::Depth => a
                .depth_km
                .partial_cmp(&b.depth_km)
                .unwrap_or(Ordering::Equal),
            SortField::Location => a.location.cmp(&b.location),
        };
        match order {
            SortOrder::Asc => comparison,
            SortOrder::Desc => comparison.reverse(),
        }
    });
    sorted
}

/// Keep records inside an inclusive magnitude range
pub fn filter_by_magnitude(quakes: &[Quake], min: f64, max: f64) -> Vec<Quake> {
    quakes
        .iter()
        .filter(|q| q.magnitude >= min && q.magnitude <= max)
        .cloned()
        .collect()
}

pub fn print_records(quakes: &[Quake], now: NaiveDateTime) {
    if quakes.is_empty() {
        println!("   (no records)");
        return;
    }
    for quake in quakes {
        println!(
            "   M{:.1} [{}] {} - {}",
            quake.magnitude,
            magnitude_label(quake.magnitude),
            quake.location,
            format_time_ago(quake.occurred_at, now)
        );
        println!(
            "        {} {} | kedalaman {} km | {} | {} | {}",
            quake.date,
            quake.time,
            quake.depth_km,
            quake.coordinates,
            intensity_description(quake.magnitude),
            quake.felt
        );
    }
}

pub fn print_stats(stats: &QuakeStats) {
    println!("\n📊 Ringkasan:");
    println!("   Total records: {}", stats.total);
    println!(
        "   Magnitude avg/max/min: {:.2} / {:.1} / {:.1}",
        stats.average_magnitude, stats.max_magnitude, stats.min_magnitude
    );
    println!("   Average depth: {:.1} km", stats.average_depth_km);
    println!("   Significant (M5.0+): {}", stats.significant_count);
    println!("   Last 24 hours: {}", stats.recent_count);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Local};

    fn quake(id: &str, magnitude: f64, depth_km: f64, location: &str) -> Quake {
        Quake {
            id: id.to_string(),
            date: "12 Des 2023".to_string(),
            time: "10:30:45 WIB".to_string(),
            occurred_at: Local::now().naive_local(),
            location: location.to_string(),
            magnitude,
            depth_km,
            latitude: -6.21,
            longitude: 106.85,
            felt: "Tidak dirasakan".to_string(),
            coordinates: "-6.21,106.85".to_string(),
            potential: None,
            shakemap: None,
        }
    }

    #[test]
    fn color_buckets_follow_severity_thresholds() {
        assert_eq!(magnitude_color(7.2), "#DC2626");
        assert_eq!(magnitude_color(6.0), "#EA580C");
        assert_eq!(magnitude_color(5.9), "#D97706");
        assert_eq!(magnitude_color(4.0), "#EAB308");
        assert_eq!(magnitude_color(3.5), "#65A30D");
        assert_eq!(magnitude_color(1.0), "#16A34A");
    }

    #[test]
    fn labels_cover_the_richter_scale() {
        assert_eq!(magnitude_label(1.5), "Sangat Kecil");
        assert_eq!(magnitude_label(4.5), "Sedang");
        assert_eq!(magnitude_label(6.5), "Besar");
        assert_eq!(magnitude_label(8.1), "Dahsyat");
    }

    #[test]
    fn intensity_descriptions_cover_the_scale() {
        assert_eq!(intensity_description(2.0), "Sangat Lemah");
        assert_eq!(intensity_description(4.2), "Sedang");
        assert_eq!(intensity_description(8.5), "Sangat Merusak");
    }

    #[test]
    fn time_ago_picks_the_right_unit() {
        let now = Local::now().naive_local();
        assert_eq!(format_time_ago(now, now), "Baru saja");
        assert_eq!(
            format_time_ago(now - Duration::minutes(5), now),
            "5 menit yang lalu"
        );
        assert_eq!(
            format_time_ago(now - Duration::hours(3), now),
            "3 jam yang lalu"
        );
        assert_eq!(
            format_time_ago(now - Duration::days(2), now),
            "2 hari yang lalu"
        );
    }

    #[test]
    fn sorting_does_not_mutate_the_input() {
        let quakes = vec![
            quake("a", 3.0, 10.0, "Bali"),
            quake("b", 6.0, 20.0, "Aceh"),
        ];
        let sorted = sort_quakes(&quakes, SortField::Magnitude, SortOrder::Desc);
        assert_eq!(sorted[0].id, "b");
        assert_eq!(quakes[0].id, "a");
    }

    #[test]
    fn sorts_by_location_ascending() {
        let quakes = vec![
            quake("a", 3.0, 10.0, "Bali"),
            quake("b", 6.0, 20.0, "Aceh"),
            quake("c", 5.0, 15.0, "Cianjur"),
        ];
        let sorted = sort_quakes(&quakes, SortField::Location, SortOrder::Asc);
        let locations: Vec<&str> = sorted.iter().map(|q| q.location.as_str()).collect();
        assert_eq!(locations, vec!["Aceh", "Bali", "Cianjur"]);
    }

    #[test]
    fn magnitude_filter_is_inclusive() {
        let quakes = vec![
            quake("a", 3.9, 10.0, "Bali"),
            quake("b", 4.0, 10.0, "Aceh"),
            quake("c", 6.0, 10.0, "Cianjur"),
        ];
        let filtered = filter_by_magnitude(&quakes, 4.0, 6.0);
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered[0].id, "b");
    }
}
