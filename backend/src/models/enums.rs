//! Closed value sets used by the data model.
//!
//! Every enum is stored as a `TEXT` column guarded by a `CHECK` constraint and
//! travels over the wire as its snake_case name.

use diesel::deserialize::{self, FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::pg::{Pg, PgValue};
use diesel::serialize::{self, IsNull, Output, ToSql};
use diesel::sql_types::Text;
use serde::{Deserialize, Serialize};
use std::io::Write;
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident { $($(#[$vmeta:meta])* $variant:ident),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash,
            Serialize, Deserialize, Display, EnumString, EnumIter, IntoStaticStr,
            AsExpression, FromSqlRow,
        )]
        #[serde(rename_all = "snake_case")]
        #[strum(serialize_all = "snake_case")]
        #[diesel(sql_type = Text)]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            pub fn as_str(self) -> &'static str {
                self.into()
            }
        }

        impl ToSql<Text, Pg> for $name {
            fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
                out.write_all(self.as_str().as_bytes())?;
                Ok(IsNull::No)
            }
        }

        impl FromSql<Text, Pg> for $name {
            fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
                let raw = <String as FromSql<Text, Pg>>::from_sql(bytes)?;
                raw.parse()
                    .map_err(|_| format!("unrecognized {} value: {}", stringify!($name), raw).into())
            }
        }
    };
}

text_enum! {
    pub enum UserRole {
        Admin,
        Operator,
        Viewer,
    }
}

text_enum! {
    #[derive(Default)]
    pub enum Language {
        #[default]
        En,
        Pl,
        De,
        Uk,
        Ru,
    }
}

text_enum! {
    #[derive(Default)]
    pub enum Theme {
        #[default]
        Light,
        Dark,
    }
}

text_enum! {
    pub enum DeviceType {
        Sensor,
        Meter,
        Gateway,
        Controller,
    }
}

text_enum! {
    #[derive(Default)]
    pub enum DeviceStatus {
        Online,
        #[default]
        Offline,
        Maintenance,
        Error,
    }
}

text_enum! {
    pub enum SensorType {
        AirQuality,
        Energy,
        Temperature,
        Humidity,
        Pressure,
    }
}

text_enum! {
    pub enum DocumentType {
        Pdf,
        Docx,
        Txt,
        Png,
        Jpg,
    }
}

text_enum! {
    pub enum MessageRole {
        User,
        Assistant,
    }
}

text_enum! {
    pub enum TileType {
        EnergyConsumption,
        AirQuality,
        DeviceStatus,
        NetworkMap,
        PowerStats,
        FailureAnalysis,
    }
}

text_enum! {
    pub enum AlertSeverity {
        Low,
        Medium,
        High,
        Critical,
    }
}

/// Artifact format for dashboard exports. Never persisted.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ExportFormat {
    Jpg,
    Pdf,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        self.into()
    }
}
