//! Unit tests for gs-sim.

use gs_core::{BaselinePixel, KpiKind, PixelIndex, PixelRecord, ScenarioKey, SectorId, SiteId, SiteSet};

use crate::{simulate, SwitchOffTable};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn record(pixel: u64, site: &str, served: Option<f64>, rsrp: Option<f64>, samples: Option<u32>) -> PixelRecord {
    PixelRecord {
        pixel_index:       PixelIndex(pixel),
        latitude:          40.0 + pixel as f64 * 0.001,
        longitude:         -3.0,
        site_id:           SiteId::from(site),
        sector_id:         SectorId::new(format!("{site}_1")),
        signal_level:      rsrp,
        quality_index:     rsrp.map(|r| (r + 130.0) / 6.0),
        served_demand:     served,
        latent_demand:     None,
        capacity_demand:   None,
        churn_probability: None,
        user_throughput:   None,
        sample_count:      samples,
        scenario:          ScenarioKey::new(1.0, 0, 2025),
    }
}

fn base(pixel: u64, value: Option<f64>) -> BaselinePixel {
    BaselinePixel {
        pixel_index:   PixelIndex(pixel),
        latitude:      40.0 + pixel as f64 * 0.001,
        longitude:     -3.0,
        signal_level:  Some(-80.0),
        quality_index: Some(9.0),
        value,
    }
}

fn sites(codes: &[&str]) -> SiteSet {
    codes.iter().copied().collect()
}

// ── Aggregation ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod aggregate {
    use super::*;
    use crate::aggregate_switch_off;

    #[test]
    fn two_sector_pixel_offload() {
        let records = [
            record(1, "A", Some(10.0), Some(-80.0), Some(40)),
            record(1, "B", Some(5.0), Some(-90.0), Some(20)),
        ];
        let table = aggregate_switch_off(&records, &sites(&["A"]));
        let agg = table.get(&PixelIndex(1)).unwrap();
        assert_eq!(agg.traffic_switched_off, 10.0);
        assert_eq!(agg.traffic_remaining, 5.0);
        assert!(!agg.coverage_loss);
        assert_eq!(agg.offload_coefficient, Some(3.0));
        assert_eq!(agg.reallocated_signal_level, Some(-90.0));
    }

    #[test]
    fn only_affected_pixels_are_aggregated() {
        let records = [
            record(1, "A", Some(1.0), None, None),
            record(2, "B", Some(1.0), None, None),
        ];
        let table = aggregate_switch_off(&records, &sites(&["A"]));
        assert_eq!(table.len(), 1);
        assert!(table.get(&PixelIndex(2)).is_none());
    }

    #[test]
    fn weighting_skips_sectors_without_samples() {
        let records = [
            record(1, "A", Some(1.0), Some(-70.0), Some(5)),
            record(1, "B", Some(1.0), Some(-80.0), Some(30)),
            record(1, "C", Some(1.0), Some(-100.0), Some(10)),
            record(1, "D", Some(1.0), Some(-50.0), None),
            record(1, "E", Some(1.0), Some(-40.0), Some(0)),
        ];
        let agg = *aggregate_switch_off(&records, &sites(&["A"])).get(&PixelIndex(1)).unwrap();
        // (-80·30 + -100·10) / 40
        assert_eq!(agg.reallocated_signal_level, Some(-85.0));
    }

    #[test]
    fn no_weighted_sector_leaves_radio_undefined() {
        let records = [
            record(1, "A", Some(1.0), Some(-70.0), Some(5)),
            record(1, "B", Some(2.0), None, Some(30)),
        ];
        let agg = *aggregate_switch_off(&records, &sites(&["A"])).get(&PixelIndex(1)).unwrap();
        assert!(!agg.coverage_loss);
        assert_eq!(agg.reallocated_signal_level, None);
        assert_eq!(agg.reallocated_quality_index, None);
    }

    #[test]
    fn missing_served_demand_counts_as_zero() {
        let records = [
            record(1, "A", None, Some(-70.0), Some(5)),
            record(1, "B", None, Some(-80.0), Some(5)),
        ];
        let agg = *aggregate_switch_off(&records, &sites(&["A"])).get(&PixelIndex(1)).unwrap();
        assert_eq!(agg.traffic_switched_off, 0.0);
        assert!(agg.coverage_loss);
        assert_eq!(agg.offload_coefficient, None);
    }

    #[test]
    fn empty_site_set_gives_empty_table() {
        let records = [record(1, "A", Some(1.0), None, None)];
        assert!(aggregate_switch_off(&records, &SiteSet::new()).is_empty());
    }

    #[test]
    fn rows_are_sorted_by_pixel() {
        let records = [
            record(9, "A", Some(1.0), None, None),
            record(3, "A", Some(1.0), None, None),
            record(5, "A", Some(1.0), None, None),
        ];
        let table = aggregate_switch_off(&records, &sites(&["A"]));
        let order: Vec<u64> = table.iter().map(|r| r.pixel_index.0).collect();
        assert_eq!(order, vec![3, 5, 9]);
        assert_eq!(table.coverage_loss_count(), 3);
    }
}

// ── Simulation ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod engine {
    use super::*;
    use crate::adjust_value;

    #[test]
    fn throughput_divided_by_offload() {
        let records = [
            record(1, "A", Some(10.0), Some(-80.0), Some(40)),
            record(1, "B", Some(5.0), Some(-90.0), Some(20)),
        ];
        let out = simulate(&records, &[base(1, Some(9.0))], &sites(&["A"]), KpiKind::UserThroughput);
        let p = out.get(PixelIndex(1)).unwrap();
        assert_eq!(p.value, Some(3.0));
        assert!(!p.coverage_loss);
    }

    #[test]
    fn demand_multiplied_by_offload() {
        let records = [
            record(1, "A", Some(10.0), None, None),
            record(1, "B", Some(5.0), None, None),
        ];
        for kpi in [KpiKind::ChurnProbability, KpiKind::ServedDemand, KpiKind::LatentDemand, KpiKind::RevenuePotential] {
            let out = simulate(&records, &[base(1, Some(2.0))], &sites(&["A"]), kpi);
            assert_eq!(out.pixels[0].value, Some(6.0), "{kpi}");
        }
    }

    #[test]
    fn identity_kpis_unchanged() {
        let records = [
            record(1, "A", Some(10.0), None, None),
            record(1, "B", Some(5.0), None, None),
        ];
        for kpi in [KpiKind::CapacityDemand, KpiKind::Roi, KpiKind::Npv, KpiKind::TimeToCongestion] {
            let out = simulate(&records, &[base(1, Some(0.25))], &sites(&["A"]), kpi);
            assert_eq!(out.pixels[0].value, Some(0.25), "{kpi}");
        }
    }

    #[test]
    fn signal_and_quality_reallocated() {
        let records = [
            record(1, "A", Some(10.0), Some(-70.0), Some(10)),
            record(1, "B", Some(5.0), Some(-94.0), Some(10)),
        ];
        let s = sites(&["A"]);
        let rsrp = simulate(&records, &[base(1, Some(-70.0))], &s, KpiKind::SignalLevel);
        assert_eq!(rsrp.pixels[0].value, Some(-94.0));
        let cqi = simulate(&records, &[base(1, Some(10.0))], &s, KpiKind::QualityIndex);
        assert_eq!(cqi.pixels[0].value, Some(6.0));
    }

    #[test]
    fn only_serving_site_removed_is_coverage_loss() {
        let records = [record(1, "A", Some(10.0), Some(-80.0), Some(40))];
        let out = simulate(&records, &[base(1, Some(9.0))], &sites(&["A"]), KpiKind::UserThroughput);
        assert!(out.pixels[0].coverage_loss);
        assert_eq!(out.pixels[0].value, None);
        assert_eq!(out.coverage_loss_count(), 1);
    }

    #[test]
    fn unaffected_pixels_pass_through() {
        let records = [
            record(1, "A", Some(10.0), None, None),
            record(1, "B", Some(5.0), None, None),
        ];
        let baseline = [base(1, Some(9.0)), base(2, Some(4.0))];
        let out = simulate(&records, &baseline, &sites(&["A"]), KpiKind::UserThroughput);
        assert_eq!(out.pixels.len(), 2);
        assert_eq!(out.get(PixelIndex(2)).unwrap().value, Some(4.0));
        assert!(!out.get(PixelIndex(2)).unwrap().coverage_loss);
    }

    #[test]
    fn affected_pixel_missing_from_baseline_produces_nothing() {
        let records = [
            record(7, "A", Some(10.0), None, None),
            record(7, "B", Some(5.0), None, None),
        ];
        let out = simulate(&records, &[base(1, Some(9.0))], &sites(&["A"]), KpiKind::UserThroughput);
        assert_eq!(out.aggregates.len(), 1);
        assert_eq!(out.pixels.len(), 1);
        assert!(out.get(PixelIndex(7)).is_none());
    }

    #[test]
    fn empty_site_set_is_baseline() {
        let records = [record(1, "A", Some(10.0), None, None)];
        let baseline = [base(1, Some(9.0)), base(2, None)];
        let out = simulate(&records, &baseline, &SiteSet::new(), KpiKind::UserThroughput);
        assert!(out.aggregates.is_empty());
        assert_eq!(out.pixels[0].value, Some(9.0));
        assert_eq!(out.pixels[1].value, None);
        assert_eq!(out.coverage_loss_count(), 0);
    }

    #[test]
    fn output_follows_baseline_order() {
        let records = [
            record(1, "A", Some(1.0), None, None),
            record(1, "B", Some(1.0), None, None),
            record(2, "A", Some(1.0), None, None),
        ];
        let baseline = [base(3, Some(1.0)), base(2, Some(1.0)), base(1, Some(1.0))];
        let out = simulate(&records, &baseline, &sites(&["A"]), KpiKind::ServedDemand);
        let order: Vec<u64> = out.pixels.iter().map(|p| p.pixel_index.0).collect();
        assert_eq!(order, vec![3, 2, 1]);
        assert_eq!(out.samples().len(), 3);
    }

    #[test]
    fn adjust_missing_baseline_value() {
        let records = [
            record(1, "A", Some(10.0), None, None),
            record(1, "B", Some(5.0), None, None),
        ];
        let table = crate::aggregate_switch_off(&records, &sites(&["A"]));
        let agg = table.get(&PixelIndex(1)).unwrap();
        assert_eq!(adjust_value(KpiKind::UserThroughput, None, agg), None);
        assert_eq!(adjust_value(KpiKind::Npv, None, agg), None);
    }
}

// ── Randomized invariants ─────────────────────────────────────────────────────

#[cfg(test)]
mod invariants {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    const SITES: [&str; 6] = ["A", "B", "C", "D", "E", "F"];

    fn random_records(rng: &mut SmallRng, pixels: u64) -> Vec<PixelRecord> {
        let mut out = Vec::new();
        for pixel in 0..pixels {
            let n = rng.gen_range(1..=4);
            for site in SITES.iter().take(n) {
                let served = rng.gen_bool(0.8).then(|| rng.gen_range(0.0..20.0));
                let rsrp = rng.gen_bool(0.9).then(|| rng.gen_range(-120.0..-60.0));
                let samples = rng.gen_bool(0.9).then(|| rng.gen_range(0..50));
                out.push(record(pixel, site, served, rsrp, samples));
            }
        }
        out
    }

    fn check(table: &SwitchOffTable, records: &[PixelRecord], removed: &SiteSet) {
        for agg in table {
            let survivors: Vec<&PixelRecord> = records
                .iter()
                .filter(|r| r.pixel_index == agg.pixel_index && !removed.contains(&r.site_id))
                .collect();

            // Zero remaining traffic ⇔ coverage loss ⇔ no offload coefficient.
            assert_eq!(agg.coverage_loss, agg.traffic_remaining == 0.0);
            assert_eq!(agg.offload_coefficient.is_some(), !agg.coverage_loss);

            if let Some(k) = agg.offload_coefficient {
                let lhs = agg.traffic_switched_off + agg.traffic_remaining;
                let rhs = k * agg.traffic_remaining;
                assert!((lhs - rhs).abs() <= 1e-9 * lhs.max(1.0), "{lhs} vs {rhs}");
            }

            if let Some(rsrp) = agg.reallocated_signal_level {
                let weighted = survivors
                    .iter()
                    .filter(|r| r.sample_count.is_some_and(|n| n > 0))
                    .filter_map(|r| r.signal_level);
                let (lo, hi) = weighted.fold((f64::MAX, f64::MIN), |(lo, hi), v| (lo.min(v), hi.max(v)));
                assert!(rsrp >= lo - 1e-9 && rsrp <= hi + 1e-9, "{rsrp} not in [{lo}, {hi}]");
            }
        }
    }

    #[test]
    fn seeded_random_switch_offs() {
        let mut rng = SmallRng::seed_from_u64(0x5eed);
        for _ in 0..50 {
            let records = random_records(&mut rng, 40);
            let removed: SiteSet = SITES
                .iter()
                .filter(|_| rng.gen_bool(0.3))
                .copied()
                .collect();
            let baseline: Vec<BaselinePixel> = (0..40).map(|p| base(p, Some(5.0))).collect();
            let out = simulate(&records, &baseline, &removed, KpiKind::UserThroughput);
            check(&out.aggregates, &records, &removed);

            for p in &out.pixels {
                if p.coverage_loss {
                    assert_eq!(p.value, None);
                }
            }
        }
    }
}

// ── Export ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod export {
    use super::*;
    use crate::{aggregate_switch_off, write_aggregates_csv, write_aggregates_writer};

    #[test]
    fn csv_columns_and_missing_values() {
        let records = [
            record(1, "A", Some(10.0), Some(-80.0), Some(40)),
            record(1, "B", Some(5.0), Some(-90.0), Some(20)),
            record(2, "A", Some(4.0), None, None),
        ];
        let table = aggregate_switch_off(&records, &sites(&["A"]));
        let mut buf = Vec::new();
        write_aggregates_writer(&table, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "index,traffic_switched_off,traffic_remaining,offload_coef,coverage_loss,geo_rsrp_realloc,geo_cqi_realloc"
        );
        assert!(lines[1].starts_with("1,10,5,3,0,-90,"));
        assert_eq!(lines[2], "2,4,0,,1,,");
    }

    #[test]
    fn csv_file_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sw_off_aggr.csv");
        write_aggregates_csv(&SwitchOffTable::default(), &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 1);
    }
}
