//! KML clean-up and polygon smoothing steps
//!
//! Steps run in this order: drop placemarks below the population limit, thin every
//! `coordinates` element, promote the `name` data field to a `<name>` element, then strip
//! `Schema` and `ExtendedData`.

use crate::document::{Document, Element};
use crate::{DocumentError, Result};
use boundary_thinning::{ThinParams, Thinned, thin};
use rayon::prelude::*;

/// `SimpleData` field holding the population of an area
pub const POPULATION_FIELD: &str = "population";

/// `SimpleData` field holding the display name of an area
pub const NAME_FIELD: &str = "name";

/// What to do with a document
#[derive(Debug, Clone)]
pub struct ProcessOptions {
    /// Thinning thresholds and pass counts
    pub params: ThinParams,
    /// Placemarks with a smaller population are removed (default 800)
    pub min_population: i64,
    /// Remove `Schema` and placemark `ExtendedData` elements (default true)
    pub strip_extended_data: bool,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            params: ThinParams::default(),
            min_population: 800,
            strip_extended_data: true,
        }
    }
}

/// Aggregated statistics of the smoothing step
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SmoothingStats {
    /// Number of `coordinates` elements thinned
    pub elements: usize,
    /// Points before thinning, summed over all elements
    pub original_points: usize,
    /// Points after thinning, summed over all elements
    pub retained_points: usize,
    /// Mean percentage left after the distance run
    pub distance_retained_pct: f64,
    /// Mean percentage left after the bearing run
    pub bearing_retained_pct: f64,
}

/// Counters for every processing step
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessReport {
    pub placemarks_removed: usize,
    pub smoothing: SmoothingStats,
    pub names_added: usize,
    pub schemas_removed: usize,
    pub extended_data_removed: usize,
}

/// Run all steps on a parsed document
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn process(document: &mut Document, options: &ProcessOptions) -> Result<ProcessReport> {
    let mut report = ProcessReport {
        placemarks_removed: remove_small_areas(document, options.min_population)?,
        smoothing: smooth_polygons(document, &options.params)?,
        names_added: add_name_elements(document)?,
        ..Default::default()
    };

    if options.strip_extended_data {
        report.schemas_removed = remove_schemas(document)?;
        report.extended_data_removed = remove_extended_data(document)?;
    }

    Ok(report)
}

/// Values of every `SimpleData` below `element` whose `name` attribute is `field`
fn simple_data(element: &Element, field: &str) -> Result<Vec<String>> {
    let mut values = Vec::new();
    for data in element.descendants("SimpleData") {
        if data.attribute("name")?.as_deref() == Some(field) {
            values.push(data.text()?);
        }
    }
    Ok(values)
}

/// Remove placemarks whose population is below `min_population`
pub fn remove_small_areas(document: &mut Document, min_population: i64) -> Result<usize> {
    tracing::info!(
        "Iterating {} placemark nodes for a minimum population of {}",
        document.elements("Placemark").len(),
        min_population
    );

    let removed = document.remove_elements(|element| {
        if !element.is("Placemark") {
            return Ok(false);
        }
        for value in simple_data(element, POPULATION_FIELD)? {
            let population: i64 = value
                .trim()
                .parse()
                .map_err(|_| DocumentError::InvalidPopulation(value.clone()))?;
            if population < min_population {
                return Ok(true);
            }
        }
        Ok(false)
    })?;

    tracing::info!("Removed {} small placemarks", removed);
    Ok(removed)
}

/// Thin the text of every `coordinates` element
///
/// Each element owns its own sequence, so elements are thinned in parallel. The first
/// malformed coordinate list aborts the whole step.
pub fn smooth_polygons(document: &mut Document, params: &ThinParams) -> Result<SmoothingStats> {
    let mut elements = document.elements_mut("coordinates");
    tracing::info!(
        "Found {} 'coordinates' elements. Smoothing out...",
        elements.len()
    );

    let results = elements
        .par_iter_mut()
        .enumerate()
        .map(|(index, element)| {
            let text = element.text()?;
            let thinned = thin(&text, params)
                .map_err(|source| DocumentError::Coordinates { index, source })?;
            element.set_text(&thinned.coordinates);
            Ok(thinned)
        })
        .collect::<Result<Vec<Thinned>>>()?;

    let stats = summarize(&results);
    tracing::info!(
        "Distance-based smoothing reduced to: {:.0}% coordinates left",
        stats.distance_retained_pct
    );
    tracing::info!(
        "Bearing-based smoothing reduced to: {:.0}% coordinates left",
        stats.bearing_retained_pct
    );
    Ok(stats)
}

fn summarize(results: &[Thinned]) -> SmoothingStats {
    if results.is_empty() {
        return SmoothingStats {
            distance_retained_pct: 100.0,
            bearing_retained_pct: 100.0,
            ..Default::default()
        };
    }

    let count = results.len() as f64;
    SmoothingStats {
        elements: results.len(),
        original_points: results.iter().map(|r| r.original_points).sum(),
        retained_points: results.iter().map(|r| r.retained_points).sum(),
        distance_retained_pct: results.iter().map(|r| r.distance_retained_pct).sum::<f64>() / count,
        bearing_retained_pct: results.iter().map(|r| r.bearing_retained_pct).sum::<f64>() / count,
    }
}

/// Give placemarks a `<name>` element from their `name` data field
///
/// Placemarks that already have a `<name>` child are left alone.
pub fn add_name_elements(document: &mut Document) -> Result<usize> {
    let mut added = 0;
    for placemark in document.elements_mut("Placemark") {
        if placemark.child_elements().any(|child| child.is("name")) {
            continue;
        }
        let Some(name) = simple_data(placemark, NAME_FIELD)?.into_iter().next() else {
            continue;
        };

        let tag = match placemark.prefix() {
            Some(prefix) => format!("{prefix}:name"),
            None => "name".to_string(),
        };
        let mut element = Element::new(tag);
        element.set_text(&name);
        placemark.prepend_child(element);
        added += 1;
    }

    tracing::info!("Replaced {} name data fields with name elements", added);
    Ok(added)
}

/// Remove every `Schema` element
pub fn remove_schemas(document: &mut Document) -> Result<usize> {
    tracing::info!("Removing schema data");
    document.remove_elements(|element| Ok(element.is("Schema")))
}

/// Remove every `ExtendedData` element inside a placemark
pub fn remove_extended_data(document: &mut Document) -> Result<usize> {
    tracing::info!("Removing all extendedData nodes");
    let mut removed = 0;
    for placemark in document.elements_mut("Placemark") {
        removed += placemark.remove_descendants(&mut |element| Ok(element.is("ExtendedData")))?;
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use boundary_thinning::GeoPoint;

    /// Dense outline around a center: many points only a few meters apart
    fn dense_outline(count: usize) -> String {
        let center = GeoPoint::new(52.09, 5.12);
        (0..count)
            .map(|i| {
                let p = center.destination(i as f64 * 360.0 / count as f64, 800.0);
                format!("{},{},0", p.lon(), p.lat())
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn placemark(name: &str, population: &str, coordinates: &str) -> String {
        format!(
            r##"<Placemark><ExtendedData><SchemaData schemaUrl="#areas"><SimpleData name="name">{name}</SimpleData><SimpleData name="population">{population}</SimpleData></SchemaData></ExtendedData><Polygon><outerBoundaryIs><LinearRing><coordinates>{coordinates}</coordinates></LinearRing></outerBoundaryIs></Polygon></Placemark>"##
        )
    }

    fn sample_kml() -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><kml xmlns="http://www.opengis.net/kml/2.2"><Document><Schema name="areas" id="areas"><SimpleField name="population" type="int"/></Schema><Folder>{}{}{}</Folder></Document></kml>"#,
            placemark("Utrecht", "361000", &dense_outline(400)),
            placemark("Hamlet", "120", &dense_outline(50)),
            placemark("Zeist", "800", "5.1,52.1 5.2,52.1 5.2,52.2 5.1,52.1"),
        )
    }

    #[test]
    fn test_process_full_document() {
        let mut document = Document::from_xml(&sample_kml()).unwrap();
        let report = process(&mut document, &ProcessOptions::default()).unwrap();

        assert_eq!(report.placemarks_removed, 1);
        assert_eq!(report.smoothing.elements, 2);
        assert_eq!(report.smoothing.original_points, 404);
        assert!(report.smoothing.retained_points < 404);
        assert_eq!(report.names_added, 2);
        assert_eq!(report.schemas_removed, 1);
        assert_eq!(report.extended_data_removed, 2);

        let xml = document.to_xml().unwrap();
        assert!(xml.contains("<Placemark><name>Utrecht</name>"));
        assert!(xml.contains("<Placemark><name>Zeist</name>"));
        assert!(!xml.contains("Hamlet"));
        assert!(!xml.contains("ExtendedData"));
        assert!(!xml.contains("<Schema"));
        // Too short to thin
        assert!(xml.contains("<coordinates>5.1,52.1 5.2,52.1 5.2,52.2 5.1,52.1</coordinates>"));
    }

    #[test]
    fn test_keep_extended_data() {
        let mut document = Document::from_xml(&sample_kml()).unwrap();
        let options = ProcessOptions {
            strip_extended_data: false,
            ..Default::default()
        };
        let report = process(&mut document, &options).unwrap();

        assert_eq!(report.schemas_removed, 0);
        assert_eq!(report.extended_data_removed, 0);
        assert_eq!(report.names_added, 2);
        assert_eq!(document.elements("ExtendedData").len(), 2);
    }

    #[test]
    fn test_invalid_population() {
        let xml = format!("<kml>{}</kml>", placemark("X", "lots", "1,2"));
        let mut document = Document::from_xml(&xml).unwrap();
        let err = remove_small_areas(&mut document, 800).unwrap_err();
        assert!(matches!(err, DocumentError::InvalidPopulation(value) if value == "lots"));
    }

    #[test]
    fn test_malformed_coordinates_abort() {
        let xml = format!(
            "<kml>{}{}</kml>",
            placemark("A", "1000", &dense_outline(20)),
            placemark("B", "1000", "1,2 3;4")
        );
        let mut document = Document::from_xml(&xml).unwrap();
        let err = smooth_polygons(&mut document, &ThinParams::default()).unwrap_err();
        assert!(matches!(err, DocumentError::Coordinates { index: 1, .. }));
    }

    #[test]
    fn test_existing_name_is_kept() {
        let xml = r#"<kml><Placemark><name>Keep</name><ExtendedData><SimpleData name="name">Other</SimpleData></ExtendedData></Placemark></kml>"#;
        let mut document = Document::from_xml(xml).unwrap();
        assert_eq!(add_name_elements(&mut document).unwrap(), 0);
        assert_eq!(document.elements("name").len(), 1);
    }

    #[test]
    fn test_name_element_uses_placemark_prefix() {
        let xml = r#"<kml:kml><kml:Placemark><kml:ExtendedData><kml:SimpleData name="name">Gouda</kml:SimpleData></kml:ExtendedData></kml:Placemark></kml:kml>"#;
        let mut document = Document::from_xml(xml).unwrap();
        assert_eq!(add_name_elements(&mut document).unwrap(), 1);
        assert!(
            document
                .to_xml()
                .unwrap()
                .contains("<kml:Placemark><kml:name>Gouda</kml:name>")
        );
    }

    #[test]
    fn test_no_coordinates() {
        let mut document = Document::from_xml("<kml/>").unwrap();
        let stats = smooth_polygons(&mut document, &ThinParams::default()).unwrap();
        assert_eq!(stats.elements, 0);
        assert_eq!(stats.distance_retained_pct, 100.0);
    }
}
