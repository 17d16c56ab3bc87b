//! Calendar provisioning: every import starts from a brand new calendar.

use log::info;

use crate::api::CalendarApi;
use crate::config::ImportConfig;
use crate::error::ImportResult;

/// Delete every calendar named `config.calendar_name`, create a fresh one
/// and color it. Returns the new calendar's id.
pub async fn find_or_create_calendar<A: CalendarApi + ?Sized>(
    api: &A,
    config: &ImportConfig,
) -> ImportResult<String> {
    let name = config.calendar_name.as_str();

    for calendar in api.list_calendars().await? {
        if calendar.name == name {
            info!("Deleting previous calendar '{}' ({})", name, calendar.id);
            api.delete_calendar(&calendar.id).await?;
        }
    }

    info!("Creating calendar '{}'", name);
    let calendar_id = api.create_calendar(name, &config.time_zone).await?;

    api.set_calendar_color(&calendar_id, config.calendar_color.id())
        .await?;

    Ok(calendar_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::CalendarSummary;
    use crate::error::ImportError;
    use crate::testing::FakeCalendarApi;

    #[tokio::test]
    async fn creates_colored_calendar() {
        let api = FakeCalendarApi::default();
        let config = ImportConfig::default();

        let id = find_or_create_calendar(&api, &config).await.unwrap();

        let calendars = api.calendars();
        assert_eq!(calendars.len(), 1);
        assert_eq!(calendars[0].id, id);
        assert_eq!(calendars[0].name, "Cours CY");
        assert_eq!(api.color_of(&id).as_deref(), Some("15"));
        assert_eq!(api.time_zone_of(&id).as_deref(), Some("Europe/Paris"));
    }

    #[tokio::test]
    async fn provisioning_twice_leaves_one_calendar() {
        let api = FakeCalendarApi::default();
        let config = ImportConfig::default();

        let first = find_or_create_calendar(&api, &config).await.unwrap();
        let second = find_or_create_calendar(&api, &config).await.unwrap();

        assert_ne!(first, second);
        let named: Vec<_> = api
            .calendars()
            .into_iter()
            .filter(|c| c.name == "Cours CY")
            .collect();
        assert_eq!(named.len(), 1);
        assert_eq!(named[0].id, second);
    }

    #[tokio::test]
    async fn removes_every_duplicate_and_keeps_other_calendars() {
        let api = FakeCalendarApi::with_calendars(vec![
            CalendarSummary {
                id: "old-1".into(),
                name: "Cours CY".into(),
            },
            CalendarSummary {
                id: "perso".into(),
                name: "Personnel".into(),
            },
            CalendarSummary {
                id: "old-2".into(),
                name: "Cours CY".into(),
            },
        ]);

        find_or_create_calendar(&api, &ImportConfig::default())
            .await
            .unwrap();

        let names: Vec<String> = api.calendars().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Personnel", "Cours CY"]);
    }

    #[tokio::test]
    async fn api_errors_propagate() {
        let api = FakeCalendarApi {
            fail_create: true,
            ..FakeCalendarApi::default()
        };

        let err = find_or_create_calendar(&api, &ImportConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ImportError::Provisioning(_)));
    }
}
