use serde::{Deserialize, Serialize};

use crate::models::vendor::GeoPosition;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobCategory {
    #[serde(rename = "Paintless Dent Repair")]
    PaintlessDentRepair,
    #[serde(rename = "Bedliners")]
    Bedliners,
    #[serde(rename = "Glass Services")]
    GlassServices,
    #[serde(rename = "Scans, Calibrations, and Diagnostics")]
    ScansCalibrationsDiagnostics,
    #[serde(rename = "Wheel Reconditioning")]
    WheelReconditioning,
    #[serde(rename = "Paint and Tape Stripes")]
    PaintAndTapeStripes,
    #[serde(rename = "Automotive Detailing")]
    AutomotiveDetailing,
    #[serde(rename = "Graphics, Wraps, and Paint Protection Films")]
    GraphicsWrapsProtectionFilms,
    #[serde(rename = "Window Tinting")]
    WindowTinting,
}

impl JobCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobCategory::PaintlessDentRepair => "Paintless Dent Repair",
            JobCategory::Bedliners => "Bedliners",
            JobCategory::GlassServices => "Glass Services",
            JobCategory::ScansCalibrationsDiagnostics => "Scans, Calibrations, and Diagnostics",
            JobCategory::WheelReconditioning => "Wheel Reconditioning",
            JobCategory::PaintAndTapeStripes => "Paint and Tape Stripes",
            JobCategory::AutomotiveDetailing => "Automotive Detailing",
            JobCategory::GraphicsWrapsProtectionFilms => {
                "Graphics, Wraps, and Paint Protection Films"
            }
            JobCategory::WindowTinting => "Window Tinting",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: String,
    pub category: JobCategory,
    pub description: String,
    pub shop_id: String,
    pub shop_name: String,
    pub shop_address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub bidding_deadline: String,
    #[serde(default)]
    pub job_picture: Option<String>,
    #[serde(default)]
    pub make: Option<String>,
}

impl Job {
    pub fn position(&self) -> GeoPosition {
        GeoPosition {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{Job, JobCategory};

    #[test]
    fn category_uses_marketplace_wire_strings() {
        let encoded = serde_json::to_value(JobCategory::ScansCalibrationsDiagnostics).unwrap();
        assert_eq!(encoded, json!("Scans, Calibrations, and Diagnostics"));

        let decoded: JobCategory = serde_json::from_value(json!("Window Tinting")).unwrap();
        assert_eq!(decoded, JobCategory::WindowTinting);
    }

    #[test]
    fn unknown_category_is_rejected() {
        let result = serde_json::from_value::<JobCategory>(json!("Upholstery"));
        assert!(result.is_err());
    }

    #[test]
    fn job_decodes_camel_case_store_document() {
        let job: Job = serde_json::from_value(json!({
            "id": "job-7",
            "category": "Bedliners",
            "description": "spray-in liner for a short bed",
            "shopId": "shop-2",
            "shopName": "Karz",
            "shopAddress": "12 Main St",
            "latitude": 40.0,
            "longitude": -75.0,
            "biddingDeadline": "2026-09-01",
            "jobPicture": "https://img.example/liner.jpg",
            "make": "Tacoma"
        }))
        .unwrap();

        assert_eq!(job.category, JobCategory::Bedliners);
        assert_eq!(job.shop_name, "Karz");
        assert_eq!(job.position().latitude, 40.0);
    }

    #[test]
    fn job_tolerates_missing_picture_and_make() {
        let job: Job = serde_json::from_value(json!({
            "id": "job-8",
            "category": "Glass Services",
            "description": "windshield chip",
            "shopId": "shop-2",
            "shopName": "Karz",
            "shopAddress": "12 Main St",
            "latitude": 40.0,
            "longitude": -75.0,
            "biddingDeadline": "2026-09-01"
        }))
        .unwrap();

        assert!(job.job_picture.is_none());
        assert!(job.make.is_none());
    }
}
