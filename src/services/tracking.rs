use chrono::{DateTime, Utc};
use rand::rngs::OsRng;
use rand::RngCore;

pub const TRACKING_PREFIX: &str = "PRCL";

/// `PRCL-<YYYYMMDD>-<6 hex>`, the suffix drawn from the OS CSPRNG. Ids are not
/// checked against existing ones; a same-day clash is a 1-in-16M event.
pub fn generate_tracking_id(now: DateTime<Utc>) -> String {
    let mut random = [0u8; 3];
    OsRng.fill_bytes(&mut random);

    format!(
        "{TRACKING_PREFIX}-{}-{}",
        now.format("%Y%m%d"),
        hex::encode_upper(random)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_tracking_id_format() {
        let now = Utc.with_ymd_and_hms(2025, 3, 7, 23, 59, 0).unwrap();
        let id = generate_tracking_id(now);

        let parts: Vec<&str> = id.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "PRCL");
        assert_eq!(parts[1], "20250307");
        assert_eq!(parts[2].len(), 6);
        assert!(parts[2]
            .chars()
            .all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c)));
    }

    #[test]
    fn test_tracking_ids_vary() {
        let now = Utc::now();
        let ids: std::collections::HashSet<_> = (0..32).map(|_| generate_tracking_id(now)).collect();
        assert!(ids.len() > 1);
    }
}
