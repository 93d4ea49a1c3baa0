//! RERA JSONL record ingestion: the chunk producer.
//!
//! One project record from the regulator's JSONL export fans out into many
//! small, independently retrievable chunks, one per category facet. Chunk
//! ids are derived from `(project_id, category, sub_index)` so re-running
//! ingestion over the same export yields identical ids.

use anyhow::Result;
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::types::{Chunk, ChunkCategory, Meta};

/// A field from the export that may arrive as string, number, bool or null.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct Field(Option<Value>);

impl Field {
    pub fn text(&self) -> Option<String> {
        match &self.0 {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Some(Value::Number(n)) => Some(n.to_string()),
            Some(Value::Bool(b)) => Some(b.to_string()),
            _ => None,
        }
    }

    pub fn or_na(&self) -> String {
        self.text().unwrap_or_else(|| "N/A".to_string())
    }

    pub fn count(&self) -> u64 {
        match &self.0 {
            Some(Value::Number(n)) => n.as_u64().unwrap_or(0),
            Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
            _ => 0,
        }
    }

    pub fn is_present(&self) -> bool {
        self.text().is_some()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectDetail {
    #[serde(default)]
    pub project_name: Field,
    #[serde(default)]
    pub registration_number: Field,
    #[serde(default)]
    pub date_of_registration: Field,
    #[serde(default)]
    pub project_type: Field,
    #[serde(default)]
    pub project_location: Field,
    #[serde(default)]
    pub proposed_completion_date_original: Field,
    #[serde(default)]
    pub proposed_completion_date_revised: Field,
    #[serde(default, rename = "is_this_project_being_developed_in_multiple_phases")]
    pub multiple_phases: Field,
    #[serde(default, rename = "landowner_types_in_the_project")]
    pub landowner_types: Field,
    #[serde(default, rename = "are_there_any_investor_other_than_the_promoter_in_the_project")]
    pub external_investors: Field,
    #[serde(default, rename = "is_there_any_litigation_against_this_proposed_project")]
    pub litigation: Field,
    #[serde(default, rename = "do_you_have_financial_encumberance")]
    pub financial_encumbrance: Field,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AreaDetail {
    #[serde(default)]
    pub state_ut: Field,
    #[serde(default)]
    pub district: Field,
    #[serde(default)]
    pub taluka: Field,
    #[serde(default)]
    pub village: Field,
    #[serde(default)]
    pub pin_code: Field,
    #[serde(default)]
    pub locality: Field,
    #[serde(default)]
    pub street_name: Field,
    #[serde(default)]
    pub landmark: Field,
    #[serde(default)]
    pub latitude: Field,
    #[serde(default)]
    pub longitude: Field,
    #[serde(default)]
    pub boundaries_north: Field,
    #[serde(default)]
    pub boundaries_south: Field,
    #[serde(default)]
    pub boundaries_east: Field,
    #[serde(default)]
    pub boundaries_west: Field,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LandAreaDetail {
    #[serde(default, rename = "land_area_for_project_applied_for_this_registration_sq_mts")]
    pub land_area_sqm: Field,
    #[serde(default, rename = "total_land_area_of_approved_layout_sq_mts")]
    pub layout_area_sqm: Field,
    #[serde(default, rename = "sanctioned_built_up_area_of_the_project_applied_for_registration")]
    pub built_up_area_sqm: Field,
    #[serde(default)]
    pub permissible_built_up_area: Field,
    #[serde(
        default,
        rename = "aggregate_area_in_sq_mts_of_recreational_open_space_as_per_layout_dp_remarks"
    )]
    pub open_space_sqm: Field,
    #[serde(default, rename = "final_plot_bearing_no_cts_number_survey_number")]
    pub plot_number: Field,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PromoterDetail {
    #[serde(default, rename = "name_of_partnership")]
    pub name: Field,
    #[serde(default)]
    pub promoter_type: Field,
    #[serde(default, rename = "promoter_official_communication_address")]
    pub address: Field,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BuildingDetail {
    #[serde(default, rename = "identification_of_building_wing_as_per_sanctioned_plan")]
    pub name: Field,
    #[serde(default, rename = "identification_of_wing_as_per_sanctioned_plan")]
    pub wing: Field,
    #[serde(
        default,
        rename = "number_of_sanctioned_floors_including_basement_stilt_podium_service_habitable_excluding_terrace"
    )]
    pub total_floors: Field,
    #[serde(default, rename = "total_no_of_building_sanctioned_habitable_floor")]
    pub habitable_floors: Field,
    #[serde(default, rename = "sanctioned_apartments_unit_nrr")]
    pub sanctioned_units: Field,
    #[serde(default, rename = "cc_issued_upto_no_of_floors")]
    pub cc_issued_upto: Field,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApartmentSummary {
    #[serde(default, rename = "identification_of_building_wing_as_per_sanctioned_plan")]
    pub building: Field,
    #[serde(default, rename = "identification_of_wing_as_per_sanctioned_plan")]
    pub wing: Field,
    #[serde(default)]
    pub floor_type: Field,
    #[serde(default, rename = "total_apartments_unit_nrr")]
    pub total_units: Field,
    #[serde(default, rename = "total_no_of_residential_apartments_units")]
    pub residential_units: Field,
    #[serde(default, rename = "total_no_of_nonresidential_apartments_units")]
    pub commercial_units: Field,
    #[serde(default, rename = "total_no_of_sold_units")]
    pub sold_units: Field,
    #[serde(default, rename = "total_no_of_unsold_units")]
    pub unsold_units: Field,
    #[serde(default, rename = "total_no_of_booked")]
    pub booked_units: Field,
    #[serde(default, rename = "total_no_of_rehab_units")]
    pub rehab_units: Field,
    #[serde(default, rename = "total_no_of_mortgage")]
    pub mortgage_units: Field,
    #[serde(default, rename = "total_no_of_reservation")]
    pub reservation_units: Field,
}

/// One line of the JSONL export.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectRecord {
    #[serde(default)]
    pub project_detail: ProjectDetail,
    #[serde(default)]
    pub project_area_detail: AreaDetail,
    #[serde(default)]
    pub project_land_area_detail: LandAreaDetail,
    #[serde(default)]
    pub promoter_details: PromoterDetail,
    #[serde(default)]
    pub building_details: Vec<BuildingDetail>,
    #[serde(default)]
    pub apartments_summary: Vec<ApartmentSummary>,
}

/// Load records from a `.jsonl` file or a directory of `.jsonl` files.
/// Unparseable lines are skipped with a warning, not fatal.
pub fn load_records(path: &Path) -> Result<Vec<ProjectRecord>> {
    let files = if path.is_dir() { list_jsonl_files(path) } else { vec![path.to_path_buf()] };
    let mut records = Vec::new();
    for file in &files {
        let content = fs::read_to_string(file)?;
        for (line_no, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<ProjectRecord>(line) {
                Ok(record) => records.push(record),
                Err(e) => {
                    warn!(file = %file.display(), line = line_no + 1, error = %e, "skipping unparseable record");
                }
            }
        }
    }
    info!(files = files.len(), records = records.len(), "loaded project records");
    Ok(records)
}

fn list_jsonl_files(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for entry in walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("jsonl") {
            files.push(path.to_path_buf());
        }
    }
    files.sort();
    files
}

/// Fans one project record out into per-category chunks.
#[derive(Default)]
pub struct RecordChunker;

impl RecordChunker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stable project id: the registration number when present, otherwise a
    /// positional fallback.
    pub fn project_id(record: &ProjectRecord, index: usize) -> String {
        record
            .project_detail
            .registration_number
            .text()
            .unwrap_or_else(|| format!("doc_{index}"))
    }

    pub fn chunk_records(&self, records: &[ProjectRecord]) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        for (i, record) in records.iter().enumerate() {
            let project_id = Self::project_id(record, i);
            chunks.extend(self.chunk_record(record, &project_id));
        }
        info!(projects = records.len(), chunks = chunks.len(), "chunked project records");
        chunks
    }

    pub fn chunk_record(&self, record: &ProjectRecord, project_id: &str) -> Vec<Chunk> {
        let mut out = Vec::new();
        let mut push = |chunk: Chunk| {
            if !chunk.text.trim().is_empty() {
                out.push(chunk);
            }
        };

        push(self.registration_chunk(record, project_id));
        push(self.status_chunk(record, project_id));
        push(self.timeline_chunk(record, project_id));
        push(self.location_chunk(record, project_id));
        if let Some(chunk) = self.geolocation_chunk(record, project_id) {
            push(chunk);
        }
        push(self.land_area_chunk(record, project_id));
        if let Some(chunk) = self.plot_chunk(record, project_id) {
            push(chunk);
        }
        push(self.promoter_chunk(record, project_id));
        push(self.legal_chunk(record, project_id));
        for (j, building) in record.building_details.iter().enumerate() {
            push(self.building_chunk(record, project_id, building, j));
        }
        for (j, apartment) in record.apartments_summary.iter().enumerate() {
            push(self.apartment_chunk(record, project_id, apartment, j));
        }
        push(self.summary_chunk(record, project_id));
        push(self.quick_fact_chunk(record, project_id));
        push(self.statistic_chunk(record, project_id));
        out
    }

    fn base_meta(&self, record: &ProjectRecord) -> Meta {
        let mut meta = Meta::new();
        meta.insert("project_name".to_string(), record.project_detail.project_name.or_na());
        meta.insert(
            "registration_number".to_string(),
            record.project_detail.registration_number.or_na(),
        );
        meta
    }

    fn registration_chunk(&self, record: &ProjectRecord, project_id: &str) -> Chunk {
        let d = &record.project_detail;
        let text = format!(
            "RERA REGISTRATION DETAILS:\n\
             Project Name: {}\n\
             RERA Registration Number: {}\n\
             Registration Date: {}\n\
             Project Type: {}\n\
             Project Location: {}\n\
             Status: ACTIVE - RERA REGISTERED",
            d.project_name.or_na(),
            d.registration_number.or_na(),
            d.date_of_registration.or_na(),
            d.project_type.or_na(),
            d.project_location.or_na(),
        );
        let mut meta = self.base_meta(record);
        meta.insert("registration_date".to_string(), d.date_of_registration.or_na());
        meta.insert("project_type".to_string(), d.project_type.or_na());
        Chunk::new(project_id, ChunkCategory::Registration, 0, text).with_metadata(meta)
    }

    fn status_chunk(&self, record: &ProjectRecord, project_id: &str) -> Chunk {
        let d = &record.project_detail;
        let text = format!(
            "PROJECT STATUS DETAILS:\n\
             Project: {}\n\
             RERA: {}\n\
             Multiple Phases: {}\n\
             Landowner Types: {}\n\
             External Investors: {}",
            d.project_name.or_na(),
            d.registration_number.or_na(),
            d.multiple_phases.or_na(),
            d.landowner_types.or_na(),
            d.external_investors.or_na(),
        );
        Chunk::new(project_id, ChunkCategory::Status, 0, text).with_metadata(self.base_meta(record))
    }

    fn timeline_chunk(&self, record: &ProjectRecord, project_id: &str) -> Chunk {
        let d = &record.project_detail;
        let timeline_status =
            if d.proposed_completion_date_revised.is_present() { "REVISED" } else { "ON SCHEDULE" };
        let text = format!(
            "PROJECT TIMELINE DETAILS:\n\
             Project: {}\n\
             RERA: {}\n\
             Registration Date: {}\n\
             Original Completion Date: {}\n\
             Revised Completion Date: {}\n\
             Timeline Status: {}",
            d.project_name.or_na(),
            d.registration_number.or_na(),
            d.date_of_registration.or_na(),
            d.proposed_completion_date_original.or_na(),
            d.proposed_completion_date_revised.or_na(),
            timeline_status,
        );
        let mut meta = self.base_meta(record);
        meta.insert("completion_date".to_string(), d.proposed_completion_date_original.or_na());
        Chunk::new(project_id, ChunkCategory::Timeline, 0, text).with_metadata(meta)
    }

    fn location_chunk(&self, record: &ProjectRecord, project_id: &str) -> Chunk {
        let a = &record.project_area_detail;
        let d = &record.project_detail;
        let text = format!(
            "LOCATION DETAILS:\n\
             Project: {}\n\
             RERA: {}\n\
             State: {}\n\
             District: {}\n\
             Taluka: {}\n\
             Village: {}\n\
             Locality: {}\n\
             Street: {}\n\
             Landmark: {}\n\
             PIN Code: {}",
            d.project_name.or_na(),
            d.registration_number.or_na(),
            a.state_ut.or_na(),
            a.district.or_na(),
            a.taluka.or_na(),
            a.village.or_na(),
            a.locality.or_na(),
            a.street_name.or_na(),
            a.landmark.or_na(),
            a.pin_code.or_na(),
        );
        let mut meta = self.base_meta(record);
        meta.insert("district".to_string(), a.district.or_na());
        meta.insert("taluka".to_string(), a.taluka.or_na());
        meta.insert("pin_code".to_string(), a.pin_code.or_na());
        Chunk::new(project_id, ChunkCategory::Location, 0, text).with_metadata(meta)
    }

    /// Only emitted when the record actually carries coordinates.
    fn geolocation_chunk(&self, record: &ProjectRecord, project_id: &str) -> Option<Chunk> {
        let a = &record.project_area_detail;
        let (lat, lon) = (a.latitude.text()?, a.longitude.text()?);
        let text = format!(
            "GEOLOCATION DETAILS:\n\
             Project: {}\n\
             Latitude: {lat}\n\
             Longitude: {lon}\n\
             Geo-coordinates: ({lat}, {lon})\n\
             Boundaries: north {} | south {} | east {} | west {}",
            record.project_detail.project_name.or_na(),
            a.boundaries_north.or_na(),
            a.boundaries_south.or_na(),
            a.boundaries_east.or_na(),
            a.boundaries_west.or_na(),
        );
        let mut meta = self.base_meta(record);
        meta.insert("latitude".to_string(), lat);
        meta.insert("longitude".to_string(), lon);
        Some(Chunk::new(project_id, ChunkCategory::Geolocation, 0, text).with_metadata(meta))
    }

    fn land_area_chunk(&self, record: &ProjectRecord, project_id: &str) -> Chunk {
        let l = &record.project_land_area_detail;
        let d = &record.project_detail;
        let text = format!(
            "LAND AREA DETAILS:\n\
             Project: {}\n\
             RERA: {}\n\
             Land Area (sqm): {}\n\
             Approved Layout Area (sqm): {}\n\
             Sanctioned Built-up Area (sqm): {}\n\
             Permissible Built-up Area (sqm): {}\n\
             Recreational Open Space (sqm): {}",
            d.project_name.or_na(),
            d.registration_number.or_na(),
            l.land_area_sqm.or_na(),
            l.layout_area_sqm.or_na(),
            l.built_up_area_sqm.or_na(),
            l.permissible_built_up_area.or_na(),
            l.open_space_sqm.or_na(),
        );
        let mut meta = self.base_meta(record);
        meta.insert("land_area_sqm".to_string(), l.land_area_sqm.or_na());
        Chunk::new(project_id, ChunkCategory::LandArea, 0, text).with_metadata(meta)
    }

    fn plot_chunk(&self, record: &ProjectRecord, project_id: &str) -> Option<Chunk> {
        let plot = record.project_land_area_detail.plot_number.text()?;
        let text = format!(
            "PLOT DETAILS:\n\
             Project: {}\n\
             Final Plot / CTS / Survey Number: {plot}",
            record.project_detail.project_name.or_na(),
        );
        let mut meta = self.base_meta(record);
        meta.insert("plot_number".to_string(), plot);
        Some(Chunk::new(project_id, ChunkCategory::Plot, 0, text).with_metadata(meta))
    }

    fn promoter_chunk(&self, record: &ProjectRecord, project_id: &str) -> Chunk {
        let p = &record.promoter_details;
        let d = &record.project_detail;
        let text = format!(
            "PROMOTER DETAILS:\n\
             Project: {}\n\
             RERA: {}\n\
             Promoter Name: {}\n\
             Promoter Type: {}\n\
             Official Communication Address: {}",
            d.project_name.or_na(),
            d.registration_number.or_na(),
            p.name.or_na(),
            p.promoter_type.or_na(),
            p.address.or_na(),
        );
        let mut meta = self.base_meta(record);
        meta.insert("promoter_name".to_string(), p.name.or_na());
        Chunk::new(project_id, ChunkCategory::Promoter, 0, text).with_metadata(meta)
    }

    fn legal_chunk(&self, record: &ProjectRecord, project_id: &str) -> Chunk {
        let d = &record.project_detail;
        let text = format!(
            "LEGAL AND FINANCIAL STATUS:\n\
             Project: {}\n\
             RERA: {}\n\
             Litigation Against Project: {}\n\
             Financial Encumbrance: {}\n\
             Landowner Types: {}\n\
             External Investors: {}",
            d.project_name.or_na(),
            d.registration_number.or_na(),
            d.litigation.or_na(),
            d.financial_encumbrance.or_na(),
            d.landowner_types.or_na(),
            d.external_investors.or_na(),
        );
        Chunk::new(project_id, ChunkCategory::Legal, 0, text).with_metadata(self.base_meta(record))
    }

    fn building_chunk(
        &self,
        record: &ProjectRecord,
        project_id: &str,
        building: &BuildingDetail,
        index: usize,
    ) -> Chunk {
        let name =
            building.name.text().unwrap_or_else(|| format!("Building_{}", index + 1));
        let text = format!(
            "BUILDING DETAILS:\n\
             Project: {}\n\
             Building Name: {name}\n\
             Wing: {}\n\
             Total Sanctioned Floors (incl. basement/stilt/podium): {}\n\
             Habitable Floors: {}\n\
             Sanctioned Apartments/Units: {}\n\
             CC Issued Up To Floors: {}",
            record.project_detail.project_name.or_na(),
            building.wing.or_na(),
            building.total_floors.or_na(),
            building.habitable_floors.or_na(),
            building.sanctioned_units.or_na(),
            building.cc_issued_upto.or_na(),
        );
        let mut meta = self.base_meta(record);
        meta.insert("building_name".to_string(), name);
        meta.insert("total_floors".to_string(), building.total_floors.or_na());
        Chunk::new(project_id, ChunkCategory::Building, index, text).with_metadata(meta)
    }

    fn apartment_chunk(
        &self,
        record: &ProjectRecord,
        project_id: &str,
        apartment: &ApartmentSummary,
        index: usize,
    ) -> Chunk {
        let building =
            apartment.building.text().unwrap_or_else(|| format!("Building_{}", index + 1));
        let text = format!(
            "APARTMENT INVENTORY:\n\
             Project: {}\n\
             Building: {building}\n\
             Wing: {}\n\
             Floor Type: {}\n\
             Total Units: {}\n\
             Residential Units: {}\n\
             Commercial Units: {}\n\
             Sold Units: {}\n\
             Unsold Units: {}\n\
             Booked Units: {}\n\
             Rehab Units: {}\n\
             Mortgage Units: {}\n\
             Reservation Units: {}",
            record.project_detail.project_name.or_na(),
            apartment.wing.or_na(),
            apartment.floor_type.or_na(),
            apartment.total_units.or_na(),
            apartment.residential_units.or_na(),
            apartment.commercial_units.or_na(),
            apartment.sold_units.or_na(),
            apartment.unsold_units.or_na(),
            apartment.booked_units.or_na(),
            apartment.rehab_units.or_na(),
            apartment.mortgage_units.or_na(),
            apartment.reservation_units.or_na(),
        );
        let mut meta = self.base_meta(record);
        meta.insert("building_name".to_string(), building);
        Chunk::new(project_id, ChunkCategory::Apartment, index, text).with_metadata(meta)
    }

    fn unit_totals(&self, record: &ProjectRecord) -> (u64, u64, u64) {
        let total = record.apartments_summary.iter().map(|a| a.total_units.count()).sum();
        let residential =
            record.apartments_summary.iter().map(|a| a.residential_units.count()).sum();
        let commercial =
            record.apartments_summary.iter().map(|a| a.commercial_units.count()).sum();
        (total, residential, commercial)
    }

    fn summary_chunk(&self, record: &ProjectRecord, project_id: &str) -> Chunk {
        let d = &record.project_detail;
        let a = &record.project_area_detail;
        let (total_units, _, _) = self.unit_totals(record);
        let text = format!(
            "PROJECT SUMMARY:\n\
             Project: {}\n\
             RERA: {}\n\
             Type: {}\n\
             Location: {}, {}\n\
             Buildings: {}\n\
             Total Units: {total_units}\n\
             Completion: {}",
            d.project_name.or_na(),
            d.registration_number.or_na(),
            d.project_type.or_na(),
            a.district.or_na(),
            a.state_ut.or_na(),
            record.building_details.len(),
            d.proposed_completion_date_original.or_na(),
        );
        let mut meta = self.base_meta(record);
        meta.insert("district".to_string(), a.district.or_na());
        Chunk::new(project_id, ChunkCategory::Summary, 0, text).with_metadata(meta)
    }

    fn quick_fact_chunk(&self, record: &ProjectRecord, project_id: &str) -> Chunk {
        let d = &record.project_detail;
        let a = &record.project_area_detail;
        let (total_units, _, _) = self.unit_totals(record);
        let text = format!(
            "QUICK FACTS:\n\
             Name: {}\n\
             RERA: {}\n\
             Buildings: {}\n\
             Units: {total_units}\n\
             Type: {}\n\
             Location: {}\n\
             Completion: {}",
            d.project_name.or_na(),
            d.registration_number.or_na(),
            record.building_details.len(),
            d.project_type.or_na(),
            a.district.or_na(),
            d.proposed_completion_date_original.or_na(),
        );
        Chunk::new(project_id, ChunkCategory::QuickFact, 0, text)
            .with_metadata(self.base_meta(record))
    }

    fn statistic_chunk(&self, record: &ProjectRecord, project_id: &str) -> Chunk {
        let d = &record.project_detail;
        let (total, residential, commercial) = self.unit_totals(record);
        let pct = |part: u64| if total > 0 { (part as f64 / total as f64) * 100.0 } else { 0.0 };
        let text = format!(
            "PROJECT STATISTICS:\n\
             Project: {}\n\
             RERA: {}\n\
             Total Buildings: {}\n\
             Total Units: {total}\n\
             Residential Units: {residential}\n\
             Commercial Units: {commercial}\n\
             Residential %: {:.2}%\n\
             Commercial %: {:.2}%",
            d.project_name.or_na(),
            d.registration_number.or_na(),
            record.building_details.len(),
            pct(residential),
            pct(commercial),
        );
        let mut meta = self.base_meta(record);
        meta.insert("total_units".to_string(), total.to_string());
        Chunk::new(project_id, ChunkCategory::Statistic, 0, text).with_metadata(meta)
    }
}
