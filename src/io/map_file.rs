//! Import of the line-oriented text map format.
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};

use crate::network::{Category, Connection, Hub, Network, Zone};

/// Reads a map file and returns the validated network it describes.
pub fn read_map(path: &Path) -> Result<Network> {
    let file =
        File::open(path).with_context(|| format!("Unable to open map file `{path:?}`"))?;
    parse_map(BufReader::new(file)).with_context(|| format!("Unable to parse map file `{path:?}`"))
}

/// Parses the line-oriented map format:
///
/// ```text
/// nb_drones: 3
/// hub: name x y [zone=restricted max_drones=2]
/// start_hub: name x y
/// end_hub: name x y
/// connection: a-b [max_link_capacity=2]
/// ```
///
/// Blank lines and lines starting with `#` are skipped. `nb_drones` must come first. Start and
/// end hubs are sized to hold the whole fleet.
pub fn parse_map<R: BufRead>(reader: R) -> Result<Network> {
    let mut parser = MapParser::default();
    for (number, line) in reader.lines().enumerate() {
        let line = line.context("Unable to read map line")?;
        parser
            .process_line(&line)
            .with_context(|| format!("Invalid map at line {}", number + 1))?;
    }
    parser.finish()
}

/// Accumulates map entities line by line; the whole map is validated in [MapParser::finish].
#[derive(Debug, Default)]
struct MapParser {
    nb_drones: Option<u32>,
    hubs: Vec<Hub>,
    has_start: bool,
    has_end: bool,
    connections: Vec<Connection>,
}

impl MapParser {
    fn process_line(&mut self, line: &str) -> Result<()> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(());
        }
        let (key, content) = line
            .split_once(':')
            .ok_or_else(|| anyhow!("missing `:` separator"))?;
        let fields: Vec<&str> = content.split_whitespace().collect();
        match key.trim() {
            "nb_drones" => self.process_drones(&fields),
            "hub" => self.process_hub(&fields, Category::Intermediate),
            "start_hub" => self.process_hub(&fields, Category::Start),
            "end_hub" => self.process_hub(&fields, Category::End),
            "connection" => self.process_connection(&fields),
            other => bail!("unknown entity type `{other}`"),
        }
    }

    fn process_drones(&mut self, fields: &[&str]) -> Result<()> {
        if self.nb_drones.is_some() {
            bail!("`nb_drones` is defined more than once");
        }
        let [count] = fields else {
            bail!("`nb_drones` expects a single value");
        };
        let count: u32 = count
            .parse()
            .context("`nb_drones` must be a positive integer")?;
        if count == 0 {
            bail!("`nb_drones` must be greater than 0");
        }
        self.nb_drones = Some(count);
        Ok(())
    }

    fn process_hub(&mut self, fields: &[&str], category: Category) -> Result<()> {
        let nb_drones = self.require_drones()?;
        if fields.len() < 3 {
            bail!("hub lines expect `name x y`");
        }
        let name = fields[0];
        let x = fields[1]
            .parse()
            .with_context(|| format!("invalid x coordinate `{}`", fields[1]))?;
        let y = fields[2]
            .parse()
            .with_context(|| format!("invalid y coordinate `{}`", fields[2]))?;
        let (zone, max_drones) = match category {
            Category::Intermediate => {
                let mut zone = Zone::Normal;
                let mut max_drones = 1;
                for (key, value) in parse_options(&fields[3..])? {
                    match key.as_str() {
                        "zone" => zone = value.parse()?,
                        "max_drones" => {
                            max_drones = value
                                .parse()
                                .with_context(|| format!("invalid `max_drones` `{value}`"))?
                        }
                        other => bail!("unknown hub parameter `{other}`"),
                    }
                }
                (zone, max_drones)
            }
            Category::Start | Category::End => {
                if fields.len() > 3 {
                    bail!("start and end hubs take no extra parameters");
                }
                if category == Category::Start && self.has_start {
                    bail!("the start hub is duplicated");
                }
                if category == Category::End && self.has_end {
                    bail!("the end hub is duplicated");
                }
                // The whole fleet is parked at / delivered to these hubs.
                (Zone::Normal, nb_drones)
            }
        };
        match category {
            Category::Start => self.has_start = true,
            Category::End => self.has_end = true,
            Category::Intermediate => {}
        }
        self.hubs
            .push(Hub::new(name, category, zone, x, y, max_drones));
        Ok(())
    }

    fn process_connection(&mut self, fields: &[&str]) -> Result<()> {
        self.require_drones()?;
        if fields.is_empty() {
            bail!("connection lines expect `source-target`");
        }
        let (a, b) = fields[0].split_once('-').ok_or_else(|| {
            anyhow!(
                "invalid connection `{}`: expected `source-target`",
                fields[0]
            )
        })?;
        if a.is_empty() || b.is_empty() || b.contains('-') {
            bail!(
                "invalid connection `{}`: expected exactly two hub names",
                fields[0]
            );
        }
        let mut capacity = 1;
        for (key, value) in parse_options(&fields[1..])? {
            match key.as_str() {
                "max_link_capacity" => {
                    capacity = value
                        .parse()
                        .with_context(|| format!("invalid `max_link_capacity` `{value}`"))?
                }
                other => bail!("unknown connection parameter `{other}`"),
            }
        }
        self.connections.push(Connection::new(a, b, capacity));
        Ok(())
    }

    fn require_drones(&self) -> Result<u32> {
        self.nb_drones
            .ok_or_else(|| anyhow!("`nb_drones` must be defined before any other entity"))
    }

    fn finish(self) -> Result<Network> {
        let nb_drones = self
            .nb_drones
            .ok_or_else(|| anyhow!("the map does not define `nb_drones`"))?;
        Network::new(nb_drones, self.hubs, self.connections)
    }
}

/// Parses a trailing `[key=value ...]` option group.
fn parse_options(fields: &[&str]) -> Result<Vec<(String, String)>> {
    if fields.is_empty() {
        return Ok(Vec::new());
    }
    let joined = fields.join(" ");
    let inner = joined
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .ok_or_else(|| anyhow!("optional parameters must be enclosed in `[` and `]`"))?;
    inner
        .split_whitespace()
        .map(|pair| {
            pair.split_once('=')
                .map(|(key, value)| (key.to_owned(), value.to_owned()))
                .ok_or_else(|| anyhow!("invalid parameter `{pair}`: expected `key=value`"))
        })
        .collect()
}
