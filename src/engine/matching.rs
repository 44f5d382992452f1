use crate::geo::distance_km;
use crate::models::job::Job;
use crate::models::vendor::{GeoPosition, VendorPreferences};

pub fn job_matches(job: &Job, preferences: &VendorPreferences, position: &GeoPosition) -> bool {
    let distance = distance_km(position, &job.position());
    distance <= preferences.dist_pref && preferences.job_type_pref.contains(&job.category)
}

pub fn filter_jobs(
    jobs: &[Job],
    preferences: &VendorPreferences,
    position: &GeoPosition,
) -> Vec<Job> {
    jobs.iter()
        .filter(|job| job_matches(job, preferences, position))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::filter_jobs;
    use crate::models::job::{Job, JobCategory};
    use crate::models::vendor::{GeoPosition, VendorPreferences};

    fn job(id: &str, category: JobCategory, latitude: f64, longitude: f64) -> Job {
        Job {
            id: id.to_string(),
            category,
            description: "test job".to_string(),
            shop_id: "shop-1".to_string(),
            shop_name: "Karz".to_string(),
            shop_address: "12 Main St".to_string(),
            latitude,
            longitude,
            bidding_deadline: "2026-09-01".to_string(),
            job_picture: None,
            make: None,
        }
    }

    fn preferences(categories: &[JobCategory], dist_pref: f64) -> VendorPreferences {
        VendorPreferences {
            vendor_id: "v1".to_string(),
            notif_pref: None,
            job_type_pref: categories.iter().copied().collect(),
            dist_pref,
        }
    }

    fn position(latitude: f64, longitude: f64) -> GeoPosition {
        GeoPosition {
            latitude,
            longitude,
        }
    }

    #[test]
    fn retains_only_preferred_categories_within_range() {
        let jobs = vec![
            job("bedliner", JobCategory::Bedliners, 0.0, 0.0),
            job("tint", JobCategory::WindowTinting, 0.0, 1.0),
        ];
        let prefs = preferences(&[JobCategory::Bedliners], 50.0);

        let visible = filter_jobs(&jobs, &prefs, &position(0.0, 0.0));

        let ids: Vec<&str> = visible.iter().map(|j| j.id.as_str()).collect();
        assert_eq!(ids, vec!["bedliner"]);
    }

    #[test]
    fn empty_category_preference_matches_nothing() {
        let jobs = vec![
            job("a", JobCategory::Bedliners, 0.0, 0.0),
            job("b", JobCategory::GlassServices, 0.0, 0.0),
        ];
        let prefs = preferences(&[], 50.0);

        assert!(filter_jobs(&jobs, &prefs, &position(0.0, 0.0)).is_empty());
    }

    #[test]
    fn jobs_beyond_the_distance_threshold_are_dropped() {
        // ~3 km north of the vendor.
        let jobs = vec![job("near", JobCategory::Bedliners, 40.027, -75.0)];
        let here = position(40.0, -75.0);

        let within = filter_jobs(&jobs, &preferences(&[JobCategory::Bedliners], 5.0), &here);
        assert_eq!(within.len(), 1);

        let beyond = filter_jobs(&jobs, &preferences(&[JobCategory::Bedliners], 2.0), &here);
        assert!(beyond.is_empty());
    }

    #[test]
    fn nearby_job_with_wrong_category_is_still_dropped() {
        let jobs = vec![
            // ~5 km away, matching category.
            job("glass", JobCategory::GlassServices, 40.045, -75.0),
            // ~3 km away, different category.
            job("detail", JobCategory::AutomotiveDetailing, 40.027, -75.0),
        ];
        let prefs = preferences(&[JobCategory::GlassServices], 10.0);

        let visible = filter_jobs(&jobs, &prefs, &position(40.0, -75.0));

        let ids: Vec<&str> = visible.iter().map(|j| j.id.as_str()).collect();
        assert_eq!(ids, vec!["glass"]);
    }

    #[test]
    fn output_preserves_input_order() {
        let jobs = vec![
            job("first", JobCategory::Bedliners, 0.0, 0.0),
            job("second", JobCategory::Bedliners, 0.01, 0.0),
            job("third", JobCategory::Bedliners, 0.0, 0.01),
        ];
        let prefs = preferences(&[JobCategory::Bedliners], 50.0);

        let visible = filter_jobs(&jobs, &prefs, &position(0.0, 0.0));

        let ids: Vec<&str> = visible.iter().map(|j| j.id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second", "third"]);
    }
}
