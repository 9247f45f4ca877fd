//! Text commands understood by line-oriented hosts such as the console.

use anyhow::{anyhow, bail, Result};

use crate::factory::FormField;
use crate::models::Coordinates;

pub const HELP: &str = "\
commands:
  click <lat> <lng>                                  click the map
  type <running|cycling>                             change the workout type
  set <distance|duration|cadence|elevation> <value>  fill a form field
  submit                                             submit the form
  select <id>                                        click a list entry
  dump                                               print all workouts as JSON
  state                                              print the interaction state
  save-settings                                      write current settings to disk
  help | quit

the start position comes from startPosition in the settings file or
TRAILMARK_START_POSITION=\"lat,lng\"; without one the map never loads.";

#[derive(Debug, Clone, PartialEq)]
pub enum HostCommand {
    Click(Coordinates),
    Kind(String),
    Set(FormField, String),
    Submit,
    Select(String),
    Dump,
    State,
    SaveSettings,
    Help,
    Quit,
}

impl HostCommand {
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Ok(None);
        };
        let rest: Vec<&str> = words.collect();

        let command = match (verb.to_ascii_lowercase().as_str(), rest.as_slice()) {
            ("click", [lat, lng]) => {
                let lat = lat.parse::<f64>().map_err(|_| anyhow!("bad latitude '{lat}'"))?;
                let lng = lng.parse::<f64>().map_err(|_| anyhow!("bad longitude '{lng}'"))?;
                HostCommand::Click(Coordinates::new(lat, lng))
            }
            ("type", [kind]) => HostCommand::Kind(kind.to_string()),
            ("set", [field, value @ ..]) => {
                HostCommand::Set(parse_field(field)?, value.join(" "))
            }
            ("submit", []) => HostCommand::Submit,
            ("select", [id]) => HostCommand::Select(id.to_string()),
            ("dump", []) => HostCommand::Dump,
            ("state", []) => HostCommand::State,
            ("save-settings", []) => HostCommand::SaveSettings,
            ("help", _) => HostCommand::Help,
            ("quit" | "exit", []) => HostCommand::Quit,
            _ => bail!("unrecognised command '{}'", line.trim()),
        };
        Ok(Some(command))
    }
}

fn parse_field(name: &str) -> Result<FormField> {
    match name.to_ascii_lowercase().as_str() {
        "distance" => Ok(FormField::Distance),
        "duration" => Ok(FormField::Duration),
        "cadence" => Ok(FormField::Cadence),
        "elevation" => Ok(FormField::Elevation),
        other => bail!("unknown form field '{other}'"),
    }
}
