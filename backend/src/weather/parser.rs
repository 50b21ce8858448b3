//! locationforecast XML → [`ForecastDocument`].
//!
//! Only the parts the sensors need are kept: the first model's `nextrun`
//! from `<meta>` and every `<time>` under `<product>` with the variables found
//! in its `<location>` children. Anything else in the document is skipped.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::error::{WeatherError, WeatherResult};
use crate::models::{ForecastDocument, TimeEntry, Variable};

struct PendingEntry {
    valid_from: DateTime<Utc>,
    valid_to: DateTime<Utc>,
    variables: BTreeMap<String, Variable>,
}

#[derive(Default)]
struct DocumentBuilder {
    path: Vec<String>,
    saw_root: bool,
    saw_product: bool,
    saw_model: bool,
    next_run: Option<DateTime<Utc>>,
    current: Option<PendingEntry>,
    entries: Vec<TimeEntry>,
}

impl DocumentBuilder {
    fn at(&self, expected: &[&str]) -> bool {
        self.path.len() == expected.len()
            && self.path.iter().zip(expected).all(|(have, want)| have == want)
    }

    fn open(&mut self, element: &BytesStart<'_>, empty: bool) -> WeatherResult<()> {
        let name = element_name(element)?;

        if self.path.is_empty() {
            if name != "weatherdata" {
                return Err(WeatherError::parse(format!(
                    "unexpected root element '{}'",
                    name
                )));
            }
            self.saw_root = true;
        } else if self.at(&["weatherdata"]) && name == "product" {
            self.saw_product = true;
        } else if self.at(&["weatherdata", "meta"]) && name == "model" {
            // Only the first model decides when the next run is.
            if !self.saw_model {
                self.saw_model = true;
                let attrs = attributes(element)?;
                let raw = attrs
                    .get("nextrun")
                    .ok_or_else(|| WeatherError::parse("model has no nextrun"))?;
                self.next_run = Some(parse_timestamp(raw)?);
            }
        } else if self.at(&["weatherdata", "product"]) && name == "time" {
            let attrs = attributes(element)?;
            let valid_from = attrs
                .get("from")
                .ok_or_else(|| WeatherError::parse("time entry has no 'from'"))?;
            let valid_to = attrs
                .get("to")
                .ok_or_else(|| WeatherError::parse("time entry has no 'to'"))?;
            self.current = Some(PendingEntry {
                valid_from: parse_timestamp(valid_from)?,
                valid_to: parse_timestamp(valid_to)?,
                variables: BTreeMap::new(),
            });
        } else if self.at(&["weatherdata", "product", "time", "location"]) {
            let variable = Variable::new(attributes(element)?);
            if let Some(entry) = self.current.as_mut() {
                entry.variables.entry(name.clone()).or_insert(variable);
            }
        }

        self.path.push(name);
        if empty {
            self.close();
        }
        Ok(())
    }

    fn close(&mut self) {
        let Some(name) = self.path.pop() else {
            return;
        };
        if name == "time" && self.at(&["weatherdata", "product"]) {
            if let Some(entry) = self.current.take() {
                self.entries.push(TimeEntry::new(
                    entry.valid_from,
                    entry.valid_to,
                    entry.variables,
                ));
            }
        }
    }

    fn finish(self) -> WeatherResult<ForecastDocument> {
        if !self.path.is_empty() {
            return Err(WeatherError::parse("unexpected end of document"));
        }
        if !self.saw_root {
            return Err(WeatherError::parse("missing weatherdata element"));
        }
        let next_run = self
            .next_run
            .ok_or_else(|| WeatherError::parse("missing meta/model"))?;
        if !self.saw_product {
            return Err(WeatherError::parse("missing product element"));
        }

        Ok(ForecastDocument {
            next_run,
            entries: self.entries,
        })
    }
}

/// Parse a locationforecast response body.
pub fn parse_forecast(text: &str) -> WeatherResult<ForecastDocument> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut builder = DocumentBuilder::default();
    loop {
        match reader.read_event()? {
            Event::Start(element) => builder.open(&element, false)?,
            Event::Empty(element) => builder.open(&element, true)?,
            Event::End(_) => builder.close(),
            Event::Eof => break,
            _ => {}
        }
    }

    builder.finish()
}

fn element_name(element: &BytesStart<'_>) -> WeatherResult<String> {
    std::str::from_utf8(element.name().as_ref())
        .map(str::to_string)
        .map_err(|e| WeatherError::parse(e.to_string()))
}

fn attributes(element: &BytesStart<'_>) -> WeatherResult<BTreeMap<String, String>> {
    let mut attrs = BTreeMap::new();
    for attr in element.attributes() {
        let attr = attr?;
        let key = std::str::from_utf8(attr.key.as_ref())
            .map_err(|e| WeatherError::parse(e.to_string()))?
            .to_string();
        let value = attr
            .unescape_value()
            .map_err(|e| WeatherError::parse(e.to_string()))?
            .into_owned();
        attrs.insert(key, value);
    }
    Ok(attrs)
}

fn parse_timestamp(raw: &str) -> WeatherResult<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(raw)?.with_timezone(&Utc))
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod parser_tests;
