use chrono::{DateTime, NaiveTime, Utc};
use diesel::dsl::{avg, sum};
use diesel::prelude::*;

use crate::contracts::DashboardStats;
use crate::db::DbPool;
use crate::error::ApiError;
use crate::models::{DashboardTile, DeviceStatus, SensorType};
use crate::schema::{alerts, dashboard_tiles, devices, sensor_readings, sensors};

/// Aggregates over the whole store for the dashboard header.
pub struct DashboardService {
    pool: DbPool,
}

impl DashboardService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn stats(&self, now: DateTime<Utc>) -> Result<DashboardStats, ApiError> {
        let mut conn = self.pool.get()?;
        let since = start_of_day(now);

        let total_devices: i64 = devices::table.count().get_result(&mut conn)?;
        let online_devices: i64 = devices::table
            .filter(devices::status.eq(DeviceStatus::Online))
            .count()
            .get_result(&mut conn)?;
        let offline_devices: i64 = devices::table
            .filter(devices::status.eq(DeviceStatus::Offline))
            .count()
            .get_result(&mut conn)?;
        let total_sensors: i64 = sensors::table.count().get_result(&mut conn)?;
        let active_alerts: i64 = alerts::table
            .filter(alerts::resolved.eq(false))
            .count()
            .get_result(&mut conn)?;

        let energy_consumption_today: Option<f64> = sensor_readings::table
            .inner_join(sensors::table)
            .filter(sensors::kind.eq(SensorType::Energy))
            .filter(sensor_readings::timestamp.ge(since))
            .select(sum(sensor_readings::value))
            .first(&mut conn)?;
        let air_quality_average: Option<f64> = sensor_readings::table
            .inner_join(sensors::table)
            .filter(sensors::kind.eq(SensorType::AirQuality))
            .filter(sensor_readings::timestamp.ge(since))
            .select(avg(sensor_readings::value))
            .first(&mut conn)?;

        Ok(DashboardStats {
            total_devices,
            online_devices,
            offline_devices,
            total_sensors,
            active_alerts,
            energy_consumption_today: energy_consumption_today.unwrap_or(0.0),
            air_quality_average: air_quality_average.unwrap_or(0.0),
        })
    }

    /// Visible tiles of a user in row-major order, optionally narrowed to `tile_ids`.
    pub fn visible_tiles(
        &self,
        user_id: i32,
        tile_ids: Option<&[i32]>,
    ) -> Result<Vec<DashboardTile>, ApiError> {
        let mut conn = self.pool.get()?;

        let mut query = dashboard_tiles::table
            .filter(dashboard_tiles::user_id.eq(user_id))
            .filter(dashboard_tiles::is_visible.eq(true))
            .into_boxed();
        if let Some(ids) = tile_ids {
            query = query.filter(dashboard_tiles::id.eq_any(ids.to_vec()));
        }

        let tiles = query
            .order((
                dashboard_tiles::position_y.asc(),
                dashboard_tiles::position_x.asc(),
                dashboard_tiles::id.asc(),
            ))
            .select(DashboardTile::as_select())
            .load(&mut conn)?;
        Ok(tiles)
    }
}

/// UTC midnight of the day containing `now`.
pub fn start_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive().and_time(NaiveTime::MIN).and_utc()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_start_of_day() {
        let now = Utc.with_ymd_and_hms(2024, 11, 3, 17, 42, 9).unwrap();
        assert_eq!(
            start_of_day(now),
            Utc.with_ymd_and_hms(2024, 11, 3, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_start_of_day_at_midnight() {
        let midnight = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(start_of_day(midnight), midnight);
    }

    #[test]
    fn test_stats_serialization() {
        let stats = DashboardStats {
            total_devices: 12,
            online_devices: 9,
            offline_devices: 2,
            total_sensors: 40,
            active_alerts: 3,
            energy_consumption_today: 1520.5,
            air_quality_average: 0.0,
        };
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["online_devices"], 9);
        assert_eq!(json["energy_consumption_today"], 1520.5);
        assert_eq!(json["air_quality_average"], 0.0);
    }
}
