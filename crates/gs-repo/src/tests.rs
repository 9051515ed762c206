//! Unit tests for gs-repo.

use gs_core::{
    AggregateRecord, BaselineQuery, CompetitiveQuery, CompetitiveRecord, CompetitiveSource, CompetitiveTable,
    KpiKind, MetricColumn, PixelIndex, PixelRecord, ScenarioKey, SectorId, SectorQuery, SectorSelection, SiteId,
    ValueRange,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

const SECTOR_CSV: &str = "\
index,latitude_50,longitude_50,site_id,sector_id,geo_rsrp,geo_cqi,geo_served_demand,geo_latent_demand,geo_cap_demand,geo_churn_prob,geo_user_tput_dl,count_samples,scenario_traffic,scenario_optim,year
1,40.0,-3.0,A,A_1,-80.0,10.0,10.0,0.1,0.05,0.02,9.0,40,1.0,0,2025
1,40.0,-3.0,B,B_1,-90.0,8.0,5.0,,,0.03,6.0,20,1.0,0,2025
2,40.1,-3.1,B,B_2,-95.0,7.0,3.0,,,0.04,5.0,,1.0,0,2025
3,40.2,-3.2,C,C_1,-70.0,12.0,8.0,,,0.01,11.0,10,1.0,0,2025
1,40.0,-3.0,A,A_1,-80.0,10.0,10.0,0.1,0.05,0.02,9.0,40,2.0,0,2025
";

const AGG_CSV: &str = "\
index,latitude_50,longitude_50,geo_rsrp,geo_cqi,geo_user_tput_dl,geo_churn_prob,geo_served_demand,geo_latent_demand,geo_cap_demand,geo_revenue_potential,roi,npv,ttc,scenario_traffic,scenario_optim,year,best_server
1,40.0,-3.0,-80.0,10.0,9.0,0.02,15.0,0.1,0.05,120.0,1.4,2500.0,18.0,1.0,0,2025,A_1
2,40.1,-3.1,-95.0,7.0,5.0,0.04,3.0,,,40.0,,,,1.0,0,2025,
3,40.2,-3.2,-70.0,,11.0,0.01,8.0,,,90.0,,,,1.0,0,2025,C_1
";

const DETAIL_CSV: &str = "\
Latitude,Longitude,Connection_ServiceProviderBrandName,band_category,roads_proximity,population,QOS_RSRP,dl_tput
40.0,-3.0,Acme,LB,1,100.0,-85.0,12.0
40.1,-3.1,Acme,LB,2,100.0,-95.0,
40.2,-3.2,Acme,HB,1,100.0,-85.0,30.0
40.3,-3.3,Rival,LB,1,100.0,-80.0,20.0
40.4,-3.4,Acme,LB,1,5.0,-85.0,8.0
";

const CATEGORY_CSV: &str = "\
Latitude,Longitude,target_csp,band_category,roads_proximity,population,coverage_cat
40.0,-3.0,Acme,LB,1,100.0,3.0
40.1,-3.1,Acme,LB,1,100.0,0.0
40.2,-3.2,Acme,LB,2,100.0,5.0
40.3,-3.3,Acme,LB,1,100.0,
";

fn scenario() -> ScenarioKey {
    ScenarioKey::new(1.0, 0, 2025)
}

fn sectors() -> Vec<PixelRecord> {
    crate::load_sector_records_reader(SECTOR_CSV.as_bytes()).unwrap()
}

fn aggregates() -> Vec<AggregateRecord> {
    crate::load_aggregates_reader(AGG_CSV.as_bytes()).unwrap()
}

fn detail() -> Vec<CompetitiveRecord> {
    crate::load_competitive_reader(DETAIL_CSV.as_bytes(), CompetitiveTable::Detail).unwrap()
}

fn category() -> Vec<CompetitiveRecord> {
    crate::load_competitive_reader(CATEGORY_CSV.as_bytes(), CompetitiveTable::Category).unwrap()
}

fn detail_query() -> CompetitiveQuery {
    let source = CompetitiveSource::Detail { signal_range: ValueRange::new(-90.0, -60.0).unwrap() };
    CompetitiveQuery::new("Acme", "LB", MetricColumn::new("dl_tput").unwrap(), source)
        .population(ValueRange::new(50.0, 500.0).unwrap())
}

fn category_query() -> CompetitiveQuery {
    let source = CompetitiveSource::Category { value_range: ValueRange::new(0.0, 4.0).unwrap() };
    CompetitiveQuery::new("Acme", "LB", MetricColumn::new("coverage_cat").unwrap(), source)
}

// ── CSV loader ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod loader {
    use super::*;

    #[test]
    fn sector_rows_parse_optional_fields() {
        let rows = sectors();
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0].pixel_index, PixelIndex(1));
        assert_eq!(rows[0].site_id, SiteId::from("A"));
        assert_eq!(rows[0].sample_count, Some(40));
        assert_eq!(rows[1].latent_demand, None);
        assert_eq!(rows[2].sample_count, None);
        assert_eq!(rows[4].scenario.traffic_scenario, 2.0);
    }

    #[test]
    fn aggregate_rows_parse() {
        let rows = aggregates();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].kpi_value(KpiKind::Npv), Some(2500.0));
        assert_eq!(rows[1].kpi_value(KpiKind::Roi), None);
        assert_eq!(rows[2].quality_index, None);
        assert_eq!(rows[0].best_server, Some(SectorId::from("A_1")));
        assert_eq!(rows[1].best_server, None);
    }

    #[test]
    fn competitive_rows_keep_every_metric_column() {
        let rows = detail();
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0].provider, "Acme");
        assert_eq!(rows[0].roads_proximity, 1);
        assert_eq!(rows[0].signal_level(), Some(-85.0));
        assert_eq!(rows[0].metrics.get("dl_tput"), Some(&12.0));
        assert!(!rows[1].metrics.contains_key("dl_tput"));
        assert_eq!(category()[3].metrics.get("coverage_cat"), None);
    }

    #[test]
    fn competitive_table_needs_its_provider_column() {
        // Detail CSV read as the category table: no `target_csp`.
        let err = crate::load_competitive_reader(DETAIL_CSV.as_bytes(), CompetitiveTable::Category).unwrap_err();
        assert!(err.to_string().contains("target_csp"), "{err}");
    }

    #[test]
    fn non_numeric_metric_names_row_and_column() {
        let bad = "Latitude,Longitude,target_csp,band_category,roads_proximity,population,score\n\
                   40.0,-3.0,Acme,LB,1,10.0,high\n";
        let err = crate::load_competitive_reader(bad.as_bytes(), CompetitiveTable::Category).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("row 2") && msg.contains("score"), "{msg}");
    }

    #[test]
    fn malformed_row_reports_line() {
        let bad = "index,latitude_50,longitude_50,geo_rsrp,geo_cqi,geo_user_tput_dl,geo_churn_prob,geo_served_demand,geo_latent_demand,geo_cap_demand,geo_revenue_potential,roi,npv,ttc,scenario_traffic,scenario_optim,year\n\
                   x,40.0,-3.0,,,,,,,,,,,,1.0,0,2025\n";
        let err = crate::load_aggregates_reader(bad.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("row 2"), "{err}");
    }

    #[test]
    fn csv_file_roundtrip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pixel_sector.csv");
        std::fs::write(&path, SECTOR_CSV).unwrap();
        assert_eq!(crate::load_sector_records_csv(&path).unwrap().len(), 5);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = crate::load_aggregates_csv(std::path::Path::new("/nonexistent/agg.csv")).unwrap_err();
        assert!(matches!(err, crate::RepoError::Io(_)));
        assert!(err.is_retryable());
    }

    #[test]
    fn bad_data_is_not_retryable() {
        let err = crate::load_sector_records_reader("index\nnot-a-number\n".as_bytes()).unwrap_err();
        assert!(!err.is_retryable());
    }
}

// ── MemoryRepository ──────────────────────────────────────────────────────────

#[cfg(test)]
mod memory {
    use super::*;
    use crate::{MeasurementRepository, MemoryRepository, RepoError};
    use gs_core::SiteSet;

    fn repo() -> MemoryRepository {
        MemoryRepository::new(sectors(), aggregates())
            .with_competitive(CompetitiveTable::Detail, detail())
            .with_competitive(CompetitiveTable::Category, category())
    }

    #[test]
    fn switch_off_fetches_all_sectors_on_affected_pixels() {
        let sites: SiteSet = ["A"].into_iter().collect();
        let rows = repo().switch_off_records(&scenario(), &sites).unwrap();
        // Pixel 1 only; both A and B sectors, scenario 2.0 row excluded.
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.pixel_index == PixelIndex(1)));
        assert!(rows.iter().any(|r| r.site_id == SiteId::from("B")));
    }

    #[test]
    fn switch_off_with_no_sites_is_empty() {
        let rows = repo().switch_off_records(&scenario(), &SiteSet::new()).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn baseline_honours_ranges_and_tolerance() {
        let q = BaselineQuery::new(KpiKind::UserThroughput, ScenarioKey::new(1.00005, 0, 2025))
            .signal_range(ValueRange::new(-90.0, -60.0).unwrap());
        let rows = repo().baseline(&q).unwrap();
        // Pixel 2 fails the RSRP range, pixel 3 has no CQI.
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].value, Some(9.0));
    }

    #[test]
    fn sector_samples_by_site_and_sector() {
        let base = BaselineQuery::new(KpiKind::ServedDemand, scenario());
        let by_site = SectorQuery { baseline: base.clone(), selection: SectorSelection::Site(SiteId::from("B")) };
        assert_eq!(repo().sector_samples(&by_site).unwrap().len(), 2);

        let by_sector = SectorQuery {
            baseline:  base,
            selection: SectorSelection::Sectors(vec![SectorId::from("C_1")]),
        };
        let samples = repo().sector_samples(&by_sector).unwrap();
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].value, Some(8.0));
    }

    #[test]
    fn pixel_only_kpi_is_rejected_per_sector() {
        let q = SectorQuery {
            baseline:  BaselineQuery::new(KpiKind::Npv, scenario()),
            selection: SectorSelection::Site(SiteId::from("A")),
        };
        assert!(matches!(repo().sector_samples(&q), Err(RepoError::NotPerSector(KpiKind::Npv))));
    }

    #[test]
    fn competitive_detail_filters() {
        let samples = repo().competitive_samples(&detail_query()).unwrap();
        // Provider, band, population and signal filters leave only the first row.
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].value, Some(12.0));
        assert_eq!(samples[0].population, Some(100.0));

        let wide = CompetitiveQuery {
            source: CompetitiveSource::Detail { signal_range: ValueRange::new(-100.0, -60.0).unwrap() },
            ..detail_query()
        }
        .roads_proximity(2);
        let samples = repo().competitive_samples(&wide).unwrap();
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].value, None);
    }

    #[test]
    fn competitive_category_drops_non_positive_scores() {
        let samples = repo().competitive_samples(&category_query()).unwrap();
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].value, Some(3.0));

        let wide = CompetitiveQuery {
            source: CompetitiveSource::Category { value_range: ValueRange::new(-10.0, 10.0).unwrap() },
            ..category_query()
        };
        let values: Vec<_> = repo().competitive_samples(&wide).unwrap().iter().map(|s| s.value).collect();
        assert_eq!(values, vec![Some(3.0), Some(5.0)]);
    }

    #[test]
    fn competitive_tables_are_separate() {
        let only_detail = MemoryRepository::default().with_competitive(CompetitiveTable::Detail, detail());
        assert!(only_detail.competitive_samples(&category_query()).unwrap().is_empty());
    }

    #[test]
    fn best_server_skips_pixels_without_one() {
        let samples = repo().best_server_samples(&scenario()).unwrap();
        let sectors: Vec<_> = samples.iter().map(|s| (s.pixel_index, s.sector.as_str())).collect();
        assert_eq!(sectors, vec![(PixelIndex(1), "A_1"), (PixelIndex(3), "C_1")]);
        assert!(repo().best_server_samples(&ScenarioKey::new(1.0, 0, 2030)).unwrap().is_empty());
    }
}

// ── SqliteRepository ──────────────────────────────────────────────────────────

#[cfg(all(test, feature = "sqlite"))]
mod sqlite {
    use super::*;
    use crate::{MeasurementRepository, SqliteRepository};
    use gs_core::SiteSet;
    use rusqlite::Connection;

    fn seed(path: &std::path::Path) {
        let conn = Connection::open(path).unwrap();
        conn.execute_batch(
            "CREATE TABLE pixel_sector (
                 \"index\" INTEGER, latitude_50 REAL, longitude_50 REAL, site_id TEXT,
                 sector_id TEXT, geo_rsrp REAL, geo_cqi REAL, geo_served_demand REAL,
                 geo_latent_demand REAL, geo_cap_demand REAL, geo_churn_prob REAL,
                 geo_user_tput_dl REAL, count_samples INTEGER, scenario_traffic REAL,
                 scenario_optim INTEGER, year INTEGER);
             CREATE TABLE pixel_agg (
                 \"index\" INTEGER, latitude_50 REAL, longitude_50 REAL, geo_rsrp REAL,
                 geo_cqi REAL, geo_user_tput_dl REAL, geo_churn_prob REAL,
                 geo_served_demand REAL, geo_latent_demand REAL, geo_cap_demand REAL,
                 geo_revenue_potential REAL, roi REAL, npv REAL, ttc REAL,
                 scenario_traffic REAL, scenario_optim INTEGER, year INTEGER, best_server TEXT);
             CREATE TABLE csp_details_pop (
                 Latitude REAL, Longitude REAL, Connection_ServiceProviderBrandName TEXT,
                 band_category TEXT, roads_proximity INTEGER, population REAL, QOS_RSRP REAL,
                 dl_tput REAL);
             CREATE TABLE compet_cat_pop (
                 Latitude REAL, Longitude REAL, target_csp TEXT, band_category TEXT,
                 roads_proximity INTEGER, population REAL, coverage_cat REAL);",
        )
        .unwrap();
        for r in sectors() {
            conn.execute(
                "INSERT INTO pixel_sector VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15,?16)",
                rusqlite::params![
                    r.pixel_index.0 as i64, r.latitude, r.longitude, r.site_id.as_str(),
                    r.sector_id.as_str(), r.signal_level, r.quality_index, r.served_demand,
                    r.latent_demand, r.capacity_demand, r.churn_probability, r.user_throughput,
                    r.sample_count, r.scenario.traffic_scenario, r.scenario.optimization_scenario,
                    r.scenario.year,
                ],
            )
            .unwrap();
        }
        for a in aggregates() {
            conn.execute(
                "INSERT INTO pixel_agg VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15,?16,?17,?18)",
                rusqlite::params![
                    a.pixel_index.0 as i64, a.latitude, a.longitude, a.signal_level,
                    a.quality_index, a.user_throughput, a.churn_probability, a.served_demand,
                    a.latent_demand, a.capacity_demand, a.revenue_potential, a.roi, a.npv,
                    a.time_to_congestion, a.scenario.traffic_scenario,
                    a.scenario.optimization_scenario, a.scenario.year,
                    a.best_server.as_ref().map(SectorId::as_str),
                ],
            )
            .unwrap();
        }
        for r in detail() {
            conn.execute(
                "INSERT INTO csp_details_pop VALUES (?1,?2,?3,?4,?5,?6,?7,?8)",
                rusqlite::params![
                    r.latitude, r.longitude, r.provider, r.band_category, r.roads_proximity,
                    r.population, r.signal_level(), r.metrics.get("dl_tput").copied(),
                ],
            )
            .unwrap();
        }
        for r in category() {
            conn.execute(
                "INSERT INTO compet_cat_pop VALUES (?1,?2,?3,?4,?5,?6,?7)",
                rusqlite::params![
                    r.latitude, r.longitude, r.provider, r.band_category, r.roads_proximity,
                    r.population, r.metrics.get("coverage_cat").copied(),
                ],
            )
            .unwrap();
        }
    }

    #[test]
    fn sqlite_matches_memory_repository() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("measurements.db");
        seed(&path);
        let repo = SqliteRepository::open(&path).unwrap();

        let sites: SiteSet = ["A"].into_iter().collect();
        let rows = repo.switch_off_records(&scenario(), &sites).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows.iter().find(|r| r.site_id.as_str() == "A").unwrap().sample_count, Some(40));

        let q = BaselineQuery::new(KpiKind::UserThroughput, scenario())
            .signal_range(ValueRange::new(-90.0, -60.0).unwrap());
        let base = repo.baseline(&q).unwrap();
        assert_eq!(base.len(), 1);
        assert_eq!(base[0].value, Some(9.0));

        let sq = SectorQuery {
            baseline:  BaselineQuery::new(KpiKind::ServedDemand, scenario()),
            selection: SectorSelection::Site(SiteId::from("B")),
        };
        assert_eq!(repo.sector_samples(&sq).unwrap().len(), 2);

        let servers = repo.best_server_samples(&scenario()).unwrap();
        assert_eq!(servers.len(), 2);
        assert_eq!(servers[0].sector, SectorId::from("A_1"));
    }

    #[test]
    fn sqlite_competitive_matches_memory_repository() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("measurements.db");
        seed(&path);
        let repo = SqliteRepository::open(&path).unwrap();

        let samples = repo.competitive_samples(&detail_query()).unwrap();
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].value, Some(12.0));

        let any_roads = CompetitiveQuery {
            source: CompetitiveSource::Detail { signal_range: ValueRange::new(-100.0, -60.0).unwrap() },
            ..detail_query()
        };
        assert_eq!(repo.competitive_samples(&any_roads).unwrap().len(), 2);

        let samples = repo.competitive_samples(&category_query()).unwrap();
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].value, Some(3.0));
    }

    #[test]
    fn sqlite_rejects_unknown_metric_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("measurements.db");
        seed(&path);
        let repo = SqliteRepository::open(&path).unwrap();
        let q = CompetitiveQuery { metric: MetricColumn::new("no_such_metric").unwrap(), ..detail_query() };
        assert!(repo.competitive_samples(&q).is_err());
    }

    #[test]
    fn missing_database_fails_to_open() {
        let dir = tempfile::tempdir().unwrap();
        assert!(SqliteRepository::open(&dir.path().join("absent.db")).is_err());
    }
}
