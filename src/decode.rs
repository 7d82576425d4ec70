// src/decode.rs

use anyhow::{Context, Result};
use quick_xml::events::Event;
use quick_xml::Reader;

/// One raw donor-rank entry as decoded from the service response. Monetary
/// amounts stay as strings; they pass through to the CSV untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct DonorRecord {
    pub rank: i64,
    pub donor_name: String,
    /// ISO3-like code, or an aggregate token such as "UN" or "PRI_CON".
    /// Empty when the element is absent or self-closing.
    pub country_code: String,
    pub earmarked: String,
    pub un_earmarked: String,
    pub total: String,
}

/// Element path from the envelope root down to one donor entry. Namespace
/// prefixes are ignored; only local names are compared.
const DONOR_PATH: [&str; 6] = [
    "Envelope",
    "Body",
    "GetDonorRankingForOCHAOnlineV2Response",
    "GetDonorRankingForOCHAOnlineV2Result",
    "Donors",
    "DonorRankV2",
];

#[derive(Default)]
struct EntryFields {
    rank: Option<String>,
    donor_name: String,
    country_code: String,
    earmarked: String,
    un_earmarked: String,
    total: String,
}

impl EntryFields {
    fn set(&mut self, field: &str, value: String) {
        match field {
            "Rank" => self.rank = Some(value),
            "DonorName" => self.donor_name = value,
            "CountryCode" => self.country_code = value,
            "Earmarked" => self.earmarked = value,
            "UnEarmarked" => self.un_earmarked = value,
            "Total" => self.total = value,
            _ => {}
        }
    }

    fn finish(self) -> Result<DonorRecord> {
        let rank = self
            .rank
            .context("donor entry missing Rank")?
            .parse::<i64>()
            .context("donor entry has non-numeric Rank")?;
        Ok(DonorRecord {
            rank,
            donor_name: self.donor_name,
            country_code: self.country_code,
            earmarked: self.earmarked,
            un_earmarked: self.un_earmarked,
            total: self.total,
        })
    }
}

fn at_donor_entry(stack: &[String]) -> bool {
    stack.len() == DONOR_PATH.len() && stack.iter().zip(DONOR_PATH).all(|(a, b)| a == b)
}

/// Extract the donor-rank entries from a raw response body.
///
/// An absent donor-list container (a year with zero entries, or an
/// unexpected shape) yields an empty vec; a document that does not parse as
/// XML at all is an error.
pub fn decode(xml: &str) -> Result<Vec<DonorRecord>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<String> = Vec::new();
    let mut records = Vec::new();
    let mut entry: Option<EntryFields> = None;

    loop {
        match reader.read_event().context("parsing SOAP response")? {
            Event::Start(e) => {
                stack.push(String::from_utf8_lossy(e.local_name().as_ref()).to_string());
                if at_donor_entry(&stack) {
                    entry = Some(EntryFields::default());
                }
            }
            Event::Text(t) => {
                if let Some(fields) = entry.as_mut() {
                    if stack.len() == DONOR_PATH.len() + 1 {
                        let value = t.unescape().context("unescaping text")?.into_owned();
                        fields.set(stack.last().map(String::as_str).unwrap_or(""), value);
                    }
                }
            }
            Event::End(_) => {
                if at_donor_entry(&stack) {
                    if let Some(fields) = entry.take() {
                        records.push(fields.finish()?);
                    }
                }
                stack.pop();
            }
            Event::Eof => break,
            // Self-closing children (e.g. <CountryCode />) leave their field
            // at the empty default; attributes and other events are ignored.
            _ => {}
        }
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(donors: &str) -> String {
        format!(
            concat!(
                r#"<?xml version="1.0" encoding="utf-8"?>"#,
                r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">"#,
                "<soap:Body>",
                r#"<GetDonorRankingForOCHAOnlineV2Response xmlns="https://oct.unocha.org/OCTws/">"#,
                "<GetDonorRankingForOCHAOnlineV2Result>",
                "{}",
                "</GetDonorRankingForOCHAOnlineV2Result>",
                "</GetDonorRankingForOCHAOnlineV2Response>",
                "</soap:Body>",
                "</soap:Envelope>"
            ),
            donors
        )
    }

    fn donor(rank: i64, name: &str, code: &str) -> String {
        format!(
            "<DonorRankV2><Rank>{rank}</Rank><DonorName>{name}</DonorName>\
             <CountryCode>{code}</CountryCode><Earmarked>100</Earmarked>\
             <UnEarmarked>50</UnEarmarked><Total>150</Total></DonorRankV2>"
        )
    }

    #[test]
    fn decodes_multiple_entries_in_order() {
        let xml = envelope(&format!(
            "<Donors>{}{}</Donors>",
            donor(1, "United States", "USA"),
            donor(2, "Germany", "DEU"),
        ));
        let records = decode(&xml).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].rank, 1);
        assert_eq!(records[0].donor_name, "United States");
        assert_eq!(records[0].country_code, "USA");
        assert_eq!(records[0].total, "150");
        assert_eq!(records[1].donor_name, "Germany");
    }

    #[test]
    fn single_entry_yields_one_element_vec() {
        let xml = envelope(&format!("<Donors>{}</Donors>", donor(1, "Norway", "NOR")));
        let records = decode(&xml).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].country_code, "NOR");
    }

    #[test]
    fn missing_donor_container_is_empty_not_error() {
        let records = decode(&envelope("")).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn empty_donor_container_is_empty() {
        let records = decode(&envelope("<Donors></Donors>")).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn self_closing_country_code_decodes_as_empty() {
        let xml = envelope(
            "<Donors><DonorRankV2><Rank>3</Rank><DonorName>World Bank</DonorName>\
             <CountryCode /><Earmarked>1</Earmarked><UnEarmarked>2</UnEarmarked>\
             <Total>3</Total></DonorRankV2></Donors>",
        );
        let records = decode(&xml).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].country_code, "");
    }

    #[test]
    fn escaped_text_is_unescaped() {
        let xml = envelope(&format!(
            "<Donors>{}</Donors>",
            donor(1, "Trinidad &amp; Tobago", "TTO")
        ));
        let records = decode(&xml).unwrap();
        assert_eq!(records[0].donor_name, "Trinidad & Tobago");
    }

    #[test]
    fn malformed_document_is_an_error() {
        assert!(decode("<soap:Envelope><soap:Body></soap:Envelope>").is_err());
    }

    #[test]
    fn non_numeric_rank_is_an_error() {
        let xml = envelope(
            "<Donors><DonorRankV2><Rank>first</Rank><DonorName>X</DonorName>\
             <CountryCode>USA</CountryCode></DonorRankV2></Donors>",
        );
        assert!(decode(&xml).is_err());
    }
}
