//! The passenger survey record and its categorical fields.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::error::{Error, Result};
use crate::output::TableRow;

pub const AGE_MAX: u32 = 120;
pub const DISTANCE_MAX: u32 = 20_000;
pub const RATING_MAX: u8 = 5;

/// A closed set of labels read from and written to the CSV files.
pub trait Category: Copy + Sized + 'static {
    /// Every value, in declaration order.
    const ALL: &'static [Self];

    fn label(self) -> &'static str;

    /// Case-insensitive match against [`Category::label`].
    fn parse_label(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|v| v.label().eq_ignore_ascii_case(raw))
    }
}

macro_rules! category {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $label)] $variant),+
        }

        impl Category for $name {
            const ALL: &'static [Self] = &[$($name::$variant),+];

            fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

category!(Gender {
    Female => "Female",
    Male => "Male",
});

category!(CustomerType {
    Loyal => "Loyal Customer",
    Disloyal => "disloyal Customer",
});

category!(TravelType {
    Business => "Business travel",
    Personal => "Personal Travel",
});

category!(TravelClass {
    Business => "Business",
    Eco => "Eco",
    EcoPlus => "Eco Plus",
});

category!(
    /// The target label of the survey.
    Satisfaction {
        Satisfied => "satisfied",
        NeutralOrDissatisfied => "neutral or dissatisfied",
    }
);

impl Satisfaction {
    pub fn is_satisfied(self) -> bool {
        self == Satisfaction::Satisfied
    }

    /// Numeric encoding used for correlation: 1 for satisfied, 0 otherwise.
    pub fn as_indicator(self) -> f64 {
        if self.is_satisfied() { 1.0 } else { 0.0 }
    }

    /// Label used in charts and tables.
    pub fn display_name(self) -> &'static str {
        match self {
            Satisfaction::Satisfied => "Satisfied",
            Satisfaction::NeutralOrDissatisfied => "Neutral/Dissatisfied",
        }
    }
}

category!(
    /// One ordinal service rating column.
    ServiceFeature {
        InflightWifi => "Inflight wifi service",
        TimeConvenient => "Departure/Arrival time convenient",
        OnlineBooking => "Ease of Online booking",
        GateLocation => "Gate location",
        FoodAndDrink => "Food and drink",
        OnlineBoarding => "Online boarding",
        SeatComfort => "Seat comfort",
        InflightEntertainment => "Inflight entertainment",
        OnBoardService => "On-board service",
        LegRoom => "Leg room service",
        BaggageHandling => "Baggage handling",
        Checkin => "Checkin service",
        InflightService => "Inflight service",
        Cleanliness => "Cleanliness",
    }
);

impl ServiceFeature {
    pub fn rating(self, r: &PassengerRecord) -> u8 {
        r.ratings()[self as usize]
    }
}

// Column names shared by the raw and processed files.
pub const ID: &str = "id";
pub const GENDER: &str = "Gender";
pub const CUSTOMER_TYPE: &str = "Customer Type";
pub const AGE: &str = "Age";
pub const TRAVEL_TYPE: &str = "Type of Travel";
pub const CLASS: &str = "Class";
pub const FLIGHT_DISTANCE: &str = "Flight Distance";
pub const DEPARTURE_DELAY: &str = "Departure Delay in Minutes";
pub const ARRIVAL_DELAY: &str = "Arrival Delay in Minutes";
pub const SATISFACTION: &str = "satisfaction";

/// Every column of a processed file, in write order.
pub const SCHEMA: [&str; 24] = [
    ID,
    GENDER,
    CUSTOMER_TYPE,
    AGE,
    TRAVEL_TYPE,
    CLASS,
    FLIGHT_DISTANCE,
    "Inflight wifi service",
    "Departure/Arrival time convenient",
    "Ease of Online booking",
    "Gate location",
    "Food and drink",
    "Online boarding",
    "Seat comfort",
    "Inflight entertainment",
    "On-board service",
    "Leg room service",
    "Baggage handling",
    "Checkin service",
    "Inflight service",
    "Cleanliness",
    DEPARTURE_DELAY,
    ARRIVAL_DELAY,
    SATISFACTION,
];

/// One cleaned passenger row.
///
/// Field order matches the raw dataset so the processed file keeps the
/// familiar column layout. Ratings are spelled out field by field since the
/// CSV serializer cannot flatten nested structs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassengerRecord {
    #[serde(rename = "id")]
    pub id: u64,
    #[serde(rename = "Gender")]
    pub gender: Gender,
    #[serde(rename = "Customer Type")]
    pub customer_type: CustomerType,
    #[serde(rename = "Age")]
    pub age: u32,
    #[serde(rename = "Type of Travel")]
    pub travel_type: TravelType,
    #[serde(rename = "Class")]
    pub travel_class: TravelClass,
    #[serde(rename = "Flight Distance")]
    pub flight_distance: u32,

    #[serde(rename = "Inflight wifi service")]
    pub inflight_wifi: u8,
    #[serde(rename = "Departure/Arrival time convenient")]
    pub time_convenient: u8,
    #[serde(rename = "Ease of Online booking")]
    pub online_booking: u8,
    #[serde(rename = "Gate location")]
    pub gate_location: u8,
    #[serde(rename = "Food and drink")]
    pub food_and_drink: u8,
    #[serde(rename = "Online boarding")]
    pub online_boarding: u8,
    #[serde(rename = "Seat comfort")]
    pub seat_comfort: u8,
    #[serde(rename = "Inflight entertainment")]
    pub inflight_entertainment: u8,
    #[serde(rename = "On-board service")]
    pub on_board_service: u8,
    #[serde(rename = "Leg room service")]
    pub leg_room: u8,
    #[serde(rename = "Baggage handling")]
    pub baggage_handling: u8,
    #[serde(rename = "Checkin service")]
    pub checkin: u8,
    #[serde(rename = "Inflight service")]
    pub inflight_service: u8,
    #[serde(rename = "Cleanliness")]
    pub cleanliness: u8,

    #[serde(rename = "Departure Delay in Minutes")]
    pub departure_delay: u32,
    #[serde(rename = "Arrival Delay in Minutes")]
    pub arrival_delay: f64,
    #[serde(rename = "satisfaction")]
    pub satisfaction: Satisfaction,
}

impl TableRow for PassengerRecord {
    const HEADER: &'static [&'static str] = &SCHEMA;
}

impl PassengerRecord {
    /// Ratings in [`ServiceFeature`] declaration order.
    pub fn ratings(&self) -> [u8; 14] {
        [
            self.inflight_wifi,
            self.time_convenient,
            self.online_booking,
            self.gate_location,
            self.food_and_drink,
            self.online_boarding,
            self.seat_comfort,
            self.inflight_entertainment,
            self.on_board_service,
            self.leg_room,
            self.baggage_handling,
            self.checkin,
            self.inflight_service,
            self.cleanliness,
        ]
    }

    pub fn set_rating(&mut self, feature: ServiceFeature, value: u8) {
        let slot = match feature {
            ServiceFeature::InflightWifi => &mut self.inflight_wifi,
            ServiceFeature::TimeConvenient => &mut self.time_convenient,
            ServiceFeature::OnlineBooking => &mut self.online_booking,
            ServiceFeature::GateLocation => &mut self.gate_location,
            ServiceFeature::FoodAndDrink => &mut self.food_and_drink,
            ServiceFeature::OnlineBoarding => &mut self.online_boarding,
            ServiceFeature::SeatComfort => &mut self.seat_comfort,
            ServiceFeature::InflightEntertainment => &mut self.inflight_entertainment,
            ServiceFeature::OnBoardService => &mut self.on_board_service,
            ServiceFeature::LegRoom => &mut self.leg_room,
            ServiceFeature::BaggageHandling => &mut self.baggage_handling,
            ServiceFeature::Checkin => &mut self.checkin,
            ServiceFeature::InflightService => &mut self.inflight_service,
            ServiceFeature::Cleanliness => &mut self.cleanliness,
        };
        *slot = value;
    }

    /// Checks the numeric domain invariants of a cleaned record read from
    /// `source`.
    pub fn validate(&self, source: &Path) -> Result<()> {
        let out = |column: &'static str, value: String, expected: &'static str| {
            Err(Error::OutOfDomain {
                path: source.to_path_buf(),
                id: self.id,
                column,
                value,
                expected,
            })
        };

        if self.age > AGE_MAX {
            return out(AGE, self.age.to_string(), "0..=120");
        }
        if self.flight_distance > DISTANCE_MAX {
            return out(FLIGHT_DISTANCE, self.flight_distance.to_string(), "0..=20000");
        }
        for (feature, rating) in ServiceFeature::ALL.iter().zip(self.ratings()) {
            if rating > RATING_MAX {
                return out(feature.label(), rating.to_string(), "0..=5");
            }
        }
        if !self.arrival_delay.is_finite() || self.arrival_delay < 0.0 {
            return out(ARRIVAL_DELAY, self.arrival_delay.to_string(), "a finite value >= 0");
        }
        Ok(())
    }
}
