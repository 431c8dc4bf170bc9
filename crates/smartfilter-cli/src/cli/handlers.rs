//! Command handlers. Each takes already-read input and returns the text to
//! print, so the only I/O left to `commands.rs` is reading sources and
//! writing the result.

use super::render::{self, FieldRow};
use super::setup::OutputFormat;
use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use smartfilter::api::DecodeFilterDto;
use smartfilter::catalog::{describe_field, field_by_name, filterable_fields};
use smartfilter::codec::DroppedStatement;
use smartfilter::config::EngineConfig;
use smartfilter::entity::SeriesRecord;
use smartfilter::execute::{ExecutionAdapter, InMemoryCatalog, PageRequest};
use smartfilter::model::FilterV2;
use smartfilter::smart_filter::InMemorySmartFilterStore;
use smartfilter::FilterApi;

pub type Api = FilterApi<InMemorySmartFilterStore>;

/// A filter read from the command line, with what decoding dropped.
#[derive(Debug)]
pub struct LoadedFilter {
    pub filter: FilterV2,
    pub dropped: Vec<DroppedStatement>,
}

pub fn load_filter(api: &Api, text: &str, is_json: bool) -> Result<LoadedFilter> {
    if is_json {
        let filter: FilterV2 = serde_json::from_str(text).context("Invalid filter JSON")?;
        return Ok(LoadedFilter {
            filter,
            dropped: Vec::new(),
        });
    }
    let dto = api.decode_filter(&DecodeFilterDto {
        encoded_filter: text.to_string(),
    })?;
    Ok(LoadedFilter {
        filter: dto.filter,
        dropped: dto.dropped,
    })
}

pub fn encode(api: &Api, json: &str, skip_validation: bool) -> Result<String> {
    let filter: FilterV2 = serde_json::from_str(json).context("Invalid filter JSON")?;
    if !skip_validation {
        api.validate(&filter)?;
    }
    Ok(format!("{}\n", api.encode_filter(&filter)?))
}

pub fn decode(api: &Api, encoded: &str, format: OutputFormat) -> Result<String> {
    let dto = api.decode_filter(&DecodeFilterDto {
        encoded_filter: encoded.to_string(),
    })?;
    match format {
        OutputFormat::Text => {
            let mut out = render::filter_text(&dto.filter);
            out.push_str(&render::dropped_text(&dto.dropped));
            Ok(out)
        }
        _ => render::structured(&dto, format),
    }
}

pub fn check(api: &Api, loaded: &LoadedFilter, strict: bool) -> Result<String> {
    let compiled = api.validate(&loaded.filter)?;
    if strict && !loaded.dropped.is_empty() {
        bail!(
            "filter is partial: {} statements dropped\n{}",
            loaded.dropped.len(),
            render::dropped_text(&loaded.dropped).trim_end()
        );
    }
    Ok(render::check_text(&compiled, &loaded.dropped))
}

pub fn query(
    api: &Api,
    loaded: &LoadedFilter,
    rows_json: &str,
    page: PageRequest,
    now: DateTime<Utc>,
    format: OutputFormat,
) -> Result<String> {
    let rows: Vec<SeriesRecord> =
        serde_json::from_str(rows_json).context("Catalog must be a JSON array of series rows")?;
    let catalog = InMemoryCatalog::new(rows);
    let compiled = api.validate_at(&loaded.filter, now)?;
    let page = catalog.execute(&compiled, page)?;
    match format {
        OutputFormat::Text => Ok(render::page_text(&page)),
        _ => render::structured(&page, format),
    }
}

pub fn fields(name: Option<&str>, format: OutputFormat) -> Result<String> {
    let rows: Vec<FieldRow> = match name {
        Some(name) => {
            let spec = field_by_name(name)
                .and_then(describe_field)
                .filter(|spec| spec.filterable)
                .with_context(|| format!("No filterable field named {:?}", name))?;
            vec![FieldRow::from(spec)]
        }
        None => filterable_fields().map(FieldRow::from).collect(),
    };
    match format {
        OutputFormat::Text => Ok(render::fields_text(&rows)),
        _ => render::structured(&rows, format),
    }
}

pub fn config(config: &EngineConfig, template: bool) -> Result<String> {
    if template {
        return Ok(EngineConfig::template());
    }
    render::structured(config, OutputFormat::Yaml)
}

pub fn parse_now(now: Option<&str>) -> Result<DateTime<Utc>> {
    match now {
        Some(raw) => Ok(DateTime::parse_from_rfc3339(raw)
            .with_context(|| format!("Invalid --now {:?}, expected RFC 3339", raw))?
            .with_timezone(&Utc)),
        None => Ok(Utc::now()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api() -> Api {
        FilterApi::new(InMemorySmartFilterStore::new(), EngineConfig::default())
    }

    const HORROR_JSON: &str = r#"{"name":"Horror","statements":[{"field":18,"comparison":5,"value":"Horror"}]}"#;

    #[test]
    fn encode_then_check() {
        let api = api();
        let encoded = encode(&api, HORROR_JSON, false).unwrap();
        let loaded = load_filter(&api, encoded.trim(), false).unwrap();
        let report = check(&api, &loaded, true).unwrap();
        assert!(report.starts_with("ok: 1 conditions (1 on related records)"));
    }

    #[test]
    fn encode_refuses_illegal_filters() {
        let json = r#"{"statements":[{"field":1,"comparison":1,"value":"M"}]}"#;
        let err = encode(&api(), json, false).unwrap_err();
        assert!(err.to_string().contains("does not support operator"));
        assert!(encode(&api(), json, true).is_ok());
    }

    #[test]
    fn query_pages_catalog_rows() {
        let api = api();
        let loaded = load_filter(&api, HORROR_JSON, true).unwrap();
        let rows = r#"[
            {"id": 1, "name": "Uzumaki", "genres": ["Horror"]},
            {"id": 2, "name": "Berserk", "genres": ["Action", "Horror"]},
            {"id": 3, "name": "Yotsuba", "genres": ["Comedy"]}
        ]"#;
        let out = query(&api, &loaded, rows, PageRequest::new(1, 1), Utc::now(), OutputFormat::Text).unwrap();
        assert_eq!(out, "     2  Berserk\npage 1/2 (2 matching)\n");
    }

    #[test]
    fn unknown_field_name_is_an_error() {
        assert!(fields(Some("colour"), OutputFormat::Text).is_err());
        assert!(fields(Some("none"), OutputFormat::Text).is_err());
        assert!(fields(Some("genres"), OutputFormat::Json).unwrap().contains("\"mustContains\""));
    }

    #[test]
    fn parse_now_accepts_offsets() {
        let now = parse_now(Some("2024-06-01T14:00:00+02:00")).unwrap();
        assert_eq!(now.to_rfc3339(), "2024-06-01T12:00:00+00:00");
        assert!(parse_now(Some("yesterday")).is_err());
    }
}
