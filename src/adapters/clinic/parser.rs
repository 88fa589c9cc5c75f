use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

use crate::domain::{SiteInfo, Snapshot};
use crate::ports::ListingParser;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Bad selector: {0}")]
    Selector(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Missing field: {0}")]
    MissingField(String),
}

pub type ParseResult<T> = Result<T, ParseError>;

/// Parser for the clinic search results page
pub struct ClinicParser;

impl ListingParser for ClinicParser {
    fn parse(&self, html: &str) -> Result<Snapshot, Box<dyn std::error::Error + Send + Sync>> {
        Ok(parse_listing(html)?)
    }
}

/// Parse the listing page into a site snapshot.
///
/// Each site block carries a "Name on Date" heading, an address line right
/// after it, a "Vaccinations offered:" row and an "Available Appointments:"
/// count. Any block missing one of those fails the whole parse.
pub fn parse_listing(html: &str) -> ParseResult<Snapshot> {
    let document = Html::parse_document(html);

    let block_sel = sel(r#"div[class~="md:flex-shrink"][class~="text-gray-800"]"#)?;
    let heading_sel = sel("p.text-xl.font-black")?;
    let strong_sel = sel("strong")?;

    let mut snapshot = Snapshot::new();

    for block in document.select(&block_sel) {
        let heading = block
            .select(&heading_sel)
            .next()
            .ok_or_else(|| ParseError::MissingField("site heading".to_string()))?;
        let heading_text = collapse_text(&heading);
        let (name, date) = heading_text
            .split_once(" on ")
            .ok_or_else(|| ParseError::Parse(format!("heading without date: {heading_text:?}")))?;

        let address = next_element(&heading)
            .map(|el| collapse_text(&el))
            .filter(|text| !text.is_empty())
            .ok_or_else(|| ParseError::MissingField("address".to_string()))?;

        let mut vaccinations = None;
        let mut appointments = None;
        for strong in block.select(&strong_sel) {
            match collapse_text(&strong).as_str() {
                "Vaccinations offered:" => {
                    vaccinations = next_element(&strong).map(|el| collapse_text(&el));
                }
                "Available Appointments:" => {
                    let count = next_text(&strong).ok_or_else(|| {
                        ParseError::MissingField("appointment count".to_string())
                    })?;
                    appointments = Some(
                        count
                            .parse::<u32>()
                            .map_err(|e| ParseError::Parse(format!("appointment count: {e}")))?,
                    );
                }
                _ => {}
            }
        }

        let vaccinations_offered = vaccinations
            .ok_or_else(|| ParseError::MissingField("vaccinations offered".to_string()))?;
        let appointments = appointments
            .ok_or_else(|| ParseError::MissingField("available appointments".to_string()))?;

        snapshot.insert(
            name.trim(),
            SiteInfo {
                date: date.trim().to_string(),
                address,
                vaccinations_offered,
                appointments,
            },
        );
    }

    Ok(snapshot)
}

fn sel(selector: &str) -> ParseResult<Selector> {
    Selector::parse(selector).map_err(|e| ParseError::Selector(e.to_string()))
}

/// Text content of an element with whitespace collapsed
fn collapse_text(el: &ElementRef) -> String {
    el.text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Next sibling element, skipping text nodes
fn next_element<'a>(el: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    el.next_siblings().find_map(ElementRef::wrap)
}

/// First non-empty text node following an element
fn next_text(el: &ElementRef) -> Option<String> {
    el.next_siblings()
        .filter_map(|node| node.value().as_text().map(|t| t.trim().to_string()))
        .find(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"<html><body>
        <div class="md:flex-shrink text-gray-800">
          <p class="text-xl font-black">Gallatin County Fairgrounds on April 8, 2021</p>
          <p class="text-sm">901 N Black Ave, Bozeman, MT 59715</p>
          <p><strong>Vaccinations offered:</strong><span>Moderna COVID-19 Vaccine</span></p>
          <p><strong>Available Appointments:</strong> 27</p>
        </div>
        <div class="md:flex-shrink text-gray-800">
          <p class="text-xl font-black">Butte Civic Center on April 9, 2021</p>
          <p class="text-sm">1340 Harrison Ave, Butte, MT 59701</p>
          <p><strong>Vaccinations offered:</strong><span>Pfizer COVID-19 Vaccine</span></p>
          <p><strong>Available Appointments:</strong> 0</p>
        </div>
        </body></html>"#;

    #[test]
    fn test_parse_listing() {
        let snapshot = parse_listing(LISTING).unwrap();
        assert_eq!(snapshot.len(), 2);

        let site = snapshot.get("Gallatin County Fairgrounds").unwrap();
        assert_eq!(site.date, "April 8, 2021");
        assert_eq!(site.address, "901 N Black Ave, Bozeman, MT 59715");
        assert_eq!(site.vaccinations_offered, "Moderna COVID-19 Vaccine");
        assert_eq!(site.appointments, 27);

        let site = snapshot.get("Butte Civic Center").unwrap();
        assert_eq!(site.appointments, 0);
    }

    #[test]
    fn test_parse_empty_page_yields_empty_snapshot() {
        let snapshot = parse_listing("<html><body></body></html>").unwrap();
        assert!(snapshot.is_empty());
    }

    #[test]
    fn test_heading_without_date_fails() {
        let html = r#"<div class="md:flex-shrink text-gray-800">
            <p class="text-xl font-black">Gallatin County Fairgrounds</p>
            <p>901 N Black Ave, Bozeman, MT 59715</p>
            <p><strong>Vaccinations offered:</strong><span>Moderna</span></p>
            <p><strong>Available Appointments:</strong> 27</p>
            </div>"#;
        assert!(matches!(parse_listing(html), Err(ParseError::Parse(_))));
    }

    #[test]
    fn test_missing_appointment_count_fails() {
        let html = r#"<div class="md:flex-shrink text-gray-800">
            <p class="text-xl font-black">Clinic A on April 8, 2021</p>
            <p>123 Main St, Bozeman, MT</p>
            <p><strong>Vaccinations offered:</strong><span>Moderna</span></p>
            </div>"#;
        assert!(matches!(
            parse_listing(html),
            Err(ParseError::MissingField(_))
        ));
    }

    #[test]
    fn test_non_numeric_appointment_count_fails() {
        let html = r#"<div class="md:flex-shrink text-gray-800">
            <p class="text-xl font-black">Clinic A on April 8, 2021</p>
            <p>123 Main St, Bozeman, MT</p>
            <p><strong>Vaccinations offered:</strong><span>Moderna</span></p>
            <p><strong>Available Appointments:</strong> lots</p>
            </div>"#;
        assert!(matches!(parse_listing(html), Err(ParseError::Parse(_))));
    }
}
