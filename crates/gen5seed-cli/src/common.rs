//! Argument types and output helpers shared by the gen5seed binaries
//!
//! Not every binary uses every item.
#![allow(dead_code)]

use clap::{Args, ValueEnum};
use gen5seed::{
    Encounter, Gender, GeneratorConfig, Lead, Method, Outcome, SearchProgress, SearchResult,
    Shiny, StateFilter,
};
use std::io::{self, Write};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

/// Nature names in game order
pub const NATURES: [&str; 25] = [
    "Hardy", "Lonely", "Brave", "Adamant", "Naughty", "Bold", "Docile", "Relaxed", "Impish",
    "Lax", "Timid", "Hasty", "Serious", "Jolly", "Naive", "Modest", "Mild", "Quiet", "Bashful",
    "Rash", "Calm", "Gentle", "Sassy", "Careful", "Quirky",
];

/// Hidden power type names
pub const HIDDEN_POWERS: [&str; 16] = [
    "Fighting", "Flying", "Poison", "Ground", "Rock", "Bug", "Ghost", "Steel", "Fire", "Water",
    "Grass", "Electric", "Psychic", "Ice", "Dragon", "Dark",
];

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum MethodArg {
    Ivs,
    Cgear,
    Pid,
}

impl From<MethodArg> for Method {
    fn from(arg: MethodArg) -> Self {
        match arg {
            MethodArg::Ivs => Method::Ivs,
            MethodArg::Cgear => Method::CGear,
            MethodArg::Pid => Method::Pid,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum EncounterArg {
    Stationary,
    Roamer,
    Gift,
    Entralink,
    GiftEgg,
    HiddenGrotto,
}

impl From<EncounterArg> for Encounter {
    fn from(arg: EncounterArg) -> Self {
        match arg {
            EncounterArg::Stationary => Encounter::Stationary,
            EncounterArg::Roamer => Encounter::Roamer,
            EncounterArg::Gift => Encounter::Gift,
            EncounterArg::Entralink => Encounter::EntraLink,
            EncounterArg::GiftEgg => Encounter::GiftEgg,
            EncounterArg::HiddenGrotto => Encounter::HiddenGrotto,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum GenderArg {
    Male,
    Female,
}

impl From<GenderArg> for Gender {
    fn from(arg: GenderArg) -> Self {
        match arg {
            GenderArg::Male => Gender::Male,
            GenderArg::Female => Gender::Female,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ShinyArg {
    Star,
    Square,
}

/// Projection parameters
#[derive(Args, Debug)]
pub struct GeneratorArgs {
    /// RNG method
    #[arg(long, value_enum, default_value = "ivs")]
    pub method: MethodArg,

    /// Encounter kind
    #[arg(long, value_enum, default_value = "stationary")]
    pub encounter: EncounterArg,

    /// First advance
    #[arg(long, default_value_t = 0)]
    pub initial: u32,

    /// Advances after the first
    #[arg(long, default_value_t = 0)]
    pub max: u32,

    /// Trainer ID (defaults to the profile's)
    #[arg(long)]
    pub tid: Option<u16>,

    /// Secret ID (defaults to the profile's)
    #[arg(long)]
    pub sid: Option<u16>,

    /// Gender forced by Entralink / Hidden Grotto encounters (male when omitted)
    #[arg(long, value_enum)]
    pub gender: Option<GenderArg>,

    /// Species gender ratio (255 genderless, 254 female only, 0 male only)
    #[arg(long, default_value_t = 255)]
    pub gender_ratio: u8,

    /// Synchronize lead nature (0-24)
    #[arg(long, conflicts_with = "cute_charm", value_parser = clap::value_parser!(u8).range(0..25))]
    pub synchronize: Option<u8>,

    /// Cute Charm lead, pushing toward the given gender
    #[arg(long, value_enum)]
    pub cute_charm: Option<GenderArg>,
}

impl GeneratorArgs {
    pub fn config(&self, tid: u16, sid: u16) -> GeneratorConfig {
        let lead = match (self.synchronize, self.cute_charm) {
            (Some(nature), _) => Lead::Synchronize(nature),
            (None, Some(gender)) => Lead::CuteCharm(gender.into()),
            (None, None) => Lead::None,
        };
        GeneratorConfig {
            initial_advances: self.initial,
            max_advances: self.max,
            tid: self.tid.unwrap_or(tid),
            sid: self.sid.unwrap_or(sid),
            gender: self.gender.map(Gender::from),
            gender_ratio: self.gender_ratio,
            lead,
            offset: 0,
        }
    }
}

/// Outcome filter parameters
#[derive(Args, Debug)]
pub struct FilterArgs {
    /// Minimum IVs as six comma separated values
    #[arg(long, value_delimiter = ',')]
    pub iv_min: Option<Vec<u8>>,

    /// Maximum IVs as six comma separated values
    #[arg(long, value_delimiter = ',')]
    pub iv_max: Option<Vec<u8>>,

    /// Accepted natures (0-24)
    #[arg(long = "nature", value_delimiter = ',', value_parser = clap::value_parser!(u8).range(0..25))]
    pub natures: Vec<u8>,

    /// Accepted hidden power types (0-15)
    #[arg(long = "hidden-power", value_delimiter = ',', value_parser = clap::value_parser!(u8).range(0..16))]
    pub hidden_powers: Vec<u8>,

    /// Required ability slot
    #[arg(long)]
    pub ability: Option<u8>,

    /// Required gender
    #[arg(long = "filter-gender", value_enum)]
    pub filter_gender: Option<GenderArg>,

    /// Minimum shininess
    #[arg(long, value_enum)]
    pub shiny: Option<ShinyArg>,
}

impl FilterArgs {
    pub fn filter(&self) -> StateFilter {
        let mut filter = StateFilter::new();
        if self.iv_min.is_some() || self.iv_max.is_some() {
            filter = filter.with_ivs(six(&self.iv_min, 0), six(&self.iv_max, 31));
        }
        if !self.natures.is_empty() {
            filter = filter.with_natures(&self.natures);
        }
        if !self.hidden_powers.is_empty() {
            filter = filter.with_hidden_powers(&self.hidden_powers);
        }
        if let Some(ability) = self.ability {
            filter = filter.with_ability(ability);
        }
        if let Some(gender) = self.filter_gender {
            filter = filter.with_gender(gender.into());
        }
        if let Some(shiny) = self.shiny {
            filter = filter.with_shiny(match shiny {
                ShinyArg::Star => Shiny::Star,
                ShinyArg::Square => Shiny::Square,
            });
        }
        filter
    }
}

fn six(values: &Option<Vec<u8>>, default: u8) -> [u8; 6] {
    let mut out = [default; 6];
    if let Some(values) = values {
        for (slot, &v) in out.iter_mut().zip(values.iter()) {
            *slot = v;
        }
    }
    out
}

/// Parse a hexadecimal value with an optional `0x` prefix
pub fn parse_hex_u64(s: &str) -> Result<u64, String> {
    let digits = s.trim_start_matches("0x").trim_start_matches("0X");
    u64::from_str_radix(digits, 16).map_err(|e| format!("invalid hex value {:?}: {}", s, e))
}

pub fn parse_hex_u32(s: &str) -> Result<u32, String> {
    let value = parse_hex_u64(s)?;
    u32::try_from(value).map_err(|_| format!("value {:?} does not fit in 32 bits", s))
}

/// One line per outcome
pub fn format_outcome(outcome: &Outcome) -> String {
    let mut line = format!("{:>6}", outcome.advances);

    if let Some(set) = &outcome.ivs {
        let ivs: Vec<String> = set.ivs.iter().map(|iv| format!("{:>2}", iv)).collect();
        line.push_str(&format!(
            "  {}  {} {}",
            ivs.join("."),
            HIDDEN_POWERS[set.hidden_power as usize % 16],
            set.power
        ));
    }

    if let Some(p) = &outcome.personality {
        let shiny = match p.shiny {
            Shiny::None => "-",
            Shiny::Star => "Star",
            Shiny::Square => "Square",
        };
        line.push_str(&format!(
            "  {:08X}  {:<8} {} {:?} {}",
            p.pid,
            NATURES[p.nature as usize % 25],
            p.ability,
            p.gender,
            shiny
        ));
    }

    if let Some(time) = outcome.cgear_time {
        line.push_str(&format!("  timer {}", time));
    }
    if let Some(snapshot) = outcome.snapshot {
        line.push_str(&format!("  snapshot {:04X}", snapshot));
    }

    line
}

/// One line per search result
pub fn format_result(result: &SearchResult) -> String {
    let mut line = format!("{:016X}", result.seed);
    if let Some(dt) = result.datetime {
        line.push_str(&format!("  {}", dt.format("%Y-%m-%d %H:%M:%S")));
    }
    if let Some(timer0) = result.timer0 {
        line.push_str(&format!("  {:04X}", timer0));
    }
    if let Some(buttons) = result.buttons {
        line.push_str(&format!("  {}", buttons));
    }
    line.push_str("  ");
    line.push_str(&format_outcome(&result.outcome));
    line
}

/// Run `search` while printing its progress against `total`
pub fn run_with_progress<T>(
    label: &str,
    progress: &SearchProgress,
    total: u64,
    search: impl FnOnce() -> T,
) -> T {
    let (tx, rx) = mpsc::channel::<()>();
    let report = move || {
        let current = progress.progress();
        let percent = if total > 0 {
            (current as f64 / total as f64) * 100.0
        } else {
            100.0
        };
        print!("\r[{}] Progress: {:.2}% ({}/{})", label, percent, current, total);
        io::stdout().flush().ok();
    };

    let result = thread::scope(|s| {
        s.spawn(move || {
            loop {
                report();
                if let Err(RecvTimeoutError::Timeout) = rx.recv_timeout(Duration::from_millis(500)) {
                    continue;
                }
                report();
                break;
            }
        });

        let result = search();
        tx.send(()).ok();
        result
    });

    println!();
    result
}
