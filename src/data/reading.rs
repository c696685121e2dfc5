//! Meter Reading Module
//! A single timestamped row of meter counters.

use chrono::NaiveDateTime;

/// Meter counters recorded at one moment. Absent values are `NaN`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub timestamp: NaiveDateTime,
    pub water: f64,
    pub gas: f64,
    pub electricity_day: f64,
    pub electricity_night: f64,
    /// Cumulative yield of the small inverter (SMA 3000)
    pub solar_small: f64,
    /// Cumulative yield of the large inverter (SMA 7000)
    pub solar_large: f64,
}

impl Reading {
    /// Create a reading with every counter set to `NaN`.
    pub fn empty(timestamp: NaiveDateTime) -> Self {
        Self {
            timestamp,
            water: f64::NAN,
            gas: f64::NAN,
            electricity_day: f64::NAN,
            electricity_night: f64::NAN,
            solar_small: f64::NAN,
            solar_large: f64::NAN,
        }
    }

    pub fn value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Water => self.water,
            Metric::Gas => self.gas,
            Metric::ElectricityDay => self.electricity_day,
            Metric::ElectricityNight => self.electricity_night,
            Metric::SolarSmall => self.solar_small,
            Metric::SolarLarge => self.solar_large,
        }
    }

    pub fn set_value(&mut self, metric: Metric, value: f64) {
        match metric {
            Metric::Water => self.water = value,
            Metric::Gas => self.gas = value,
            Metric::ElectricityDay => self.electricity_day = value,
            Metric::ElectricityNight => self.electricity_night = value,
            Metric::SolarSmall => self.solar_small = value,
            Metric::SolarLarge => self.solar_large = value,
        }
    }

    /// Day + night electricity counters.
    pub fn electricity_total(&self) -> f64 {
        self.electricity_day + self.electricity_night
    }

    /// Combined yield of both inverters.
    pub fn solar_total(&self) -> f64 {
        self.solar_small + self.solar_large
    }
}

/// One numeric column of the meter CSV.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Water,
    Gas,
    ElectricityDay,
    ElectricityNight,
    SolarSmall,
    SolarLarge,
}

impl Metric {
    pub const ALL: [Metric; 6] = [
        Metric::Water,
        Metric::Gas,
        Metric::ElectricityDay,
        Metric::ElectricityNight,
        Metric::SolarSmall,
        Metric::SolarLarge,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Metric::Water => "Water",
            Metric::Gas => "Gas",
            Metric::ElectricityDay => "Electricity (day)",
            Metric::ElectricityNight => "Electricity (night)",
            Metric::SolarSmall => "SMA 3000",
            Metric::SolarLarge => "SMA 7000",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Metric::Water | Metric::Gas => "m³",
            _ => "kWh",
        }
    }
}
