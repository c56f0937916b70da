use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::table::{MovieRow, MovieTable};
use crate::types::{AggregateResult, Column, HistogramBin, SortOrder};

fn column_value(row: &MovieRow, column: Column) -> Result<f64> {
    column.value(&row.record).ok_or_else(|| {
        Error::data_format(format!("row {} ({:?}) has no `{}` value", row.key.0, row.record.title, column))
    })
}

/// Arithmetic mean of `column`. Zero rows is an error, never NaN.
pub fn mean(table: &MovieTable, column: Column) -> Result<f64> {
    if table.is_empty() { return Err(Error::EmptyInput("mean over a table with no rows")); }
    let mut sum = 0.0;
    for row in table.rows() { sum += column_value(row, column)?; }
    Ok(sum / table.len() as f64)
}

/// Counts one per key yielded for a row, so a key function returning several
/// keys (e.g. [`crate::mapping::genre_ids`]) explodes the row first.
pub fn group_count<K, I, F>(table: &MovieTable, key_fn: F) -> AggregateResult<K, usize>
where
    K: Ord,
    I: IntoIterator<Item = K>,
    F: Fn(&MovieRow) -> I,
{
    let mut groups = BTreeMap::new();
    for row in table.rows() {
        for key in key_fn(row) { *groups.entry(key).or_insert(0) += 1; }
    }
    AggregateResult::new(groups)
}

/// Mean of `column` per key. Each row lands in exactly one group; with
/// [`crate::mapping::joined_genre_key`] that group is the whole genre combination.
pub fn group_mean<K, F>(table: &MovieTable, key_fn: F, column: Column) -> Result<AggregateResult<K, f64>>
where
    K: Ord,
    F: Fn(&MovieRow) -> K,
{
    let mut acc: BTreeMap<K, (f64, usize)> = BTreeMap::new();
    for row in table.rows() {
        let v = column_value(row, column)?;
        let e = acc.entry(key_fn(row)).or_insert((0.0, 0));
        e.0 += v;
        e.1 += 1;
    }
    Ok(AggregateResult::new(acc.into_iter().map(|(k, (sum, n))| (k, sum / n as f64)).collect()))
}

/// Stable sort by `column` (ties keep table order), truncated to `n` rows.
pub fn top_n(table: &MovieTable, column: Column, n: usize, order: SortOrder) -> Result<MovieTable> {
    let mut keyed = table
        .rows()
        .iter()
        .map(|r| Ok((column_value(r, column)?, r)))
        .collect::<Result<Vec<_>>>()?;
    keyed.sort_by(|a, b| match order {
        SortOrder::Ascending => a.0.total_cmp(&b.0),
        SortOrder::Descending => b.0.total_cmp(&a.0),
    });
    Ok(MovieTable::from_rows(keyed.into_iter().take(n).map(|(_, r)| r.clone()).collect()))
}

/// Equal-width bins over `[min, max]`; the last bin includes `max`.
/// A single distinct value gets the range `[v - 0.5, v + 0.5]`.
pub fn histogram(table: &MovieTable, column: Column, bins: usize) -> Result<Vec<HistogramBin>> {
    if bins == 0 { return Err(Error::InvalidArgument("histogram needs at least one bin".to_string())); }
    if table.is_empty() { return Err(Error::EmptyInput("histogram over a table with no rows")); }
    let values = table.rows().iter().map(|r| column_value(r, column)).collect::<Result<Vec<_>>>()?;
    let (mut lo, mut hi) = values.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(*v), hi.max(*v)));
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }
    let width = (hi - lo) / bins as f64;
    let mut out: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            lower: lo + width * i as f64,
            upper: if i + 1 == bins { hi } else { lo + width * (i + 1) as f64 },
            count: 0,
        })
        .collect();
    for v in values {
        let mut idx = (((v - lo) / width).floor() as usize).min(bins - 1);
        // Rounding in the division can disagree with the printed edges.
        if idx + 1 < bins && v >= out[idx + 1].lower {
            idx += 1;
        } else if idx > 0 && v < out[idx].lower {
            idx -= 1;
        }
        out[idx].count += 1;
    }
    Ok(out)
}

/// `(revenue, vote_average)` for rows that carry both; `None` when no row does.
pub fn revenue_pairs(table: &MovieTable) -> Option<Vec<(i64, f64)>> {
    let pairs: Vec<_> = table
        .rows()
        .iter()
        .filter_map(|r| Some((r.record.revenue?, r.record.vote_average?)))
        .collect();
    if pairs.is_empty() { None } else { Some(pairs) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MovieRecord;
    use crate::mapping::{genre_ids, joined_genre_key, release_month};
    use crate::types::MonthPeriod;

    fn table(rows: &[(&str, f64, &[u32])]) -> MovieTable {
        let recs: Vec<_> = rows.iter().map(|(t, v, g)| MovieRecord::new(t, "2024-12-01", *v, g)).collect();
        MovieTable::from_records(&recs).unwrap()
    }

    #[test]
    fn exploded_genre_count() {
        let t = table(&[("A", 8.0, &[1, 2]), ("B", 6.0, &[2])]);
        let res = group_count(&t, genre_ids);
        assert_eq!(res.into_map(), BTreeMap::from([(1, 1), (2, 2)]));
    }

    #[test]
    fn joined_key_mean_keeps_combinations_apart() {
        let t = table(&[("A", 8.0, &[1, 2]), ("B", 6.0, &[2])]);
        let res = group_mean(&t, joined_genre_key, Column::VoteAverage).unwrap();
        assert_eq!(res.into_map(), BTreeMap::from([("1, 2".to_string(), 8.0), ("2".to_string(), 6.0)]));
    }

    #[test]
    fn compound_count_uses_one_key_per_row() {
        let t = table(&[("A", 8.0, &[1, 2]), ("B", 6.0, &[2]), ("C", 5.0, &[1, 2])]);
        let res = group_count(&t, |r| [joined_genre_key(r)]);
        assert_eq!(res.get(&"1, 2".to_string()), Some(&2));
        assert_eq!(res.get(&"2".to_string()), Some(&1));
        assert_eq!(res.len(), 2);
    }

    #[test]
    fn top_n_sorts_descending_and_truncates() {
        let t = table(&[("A", 5.0, &[]), ("B", 9.0, &[]), ("C", 7.0, &[])]);
        let top = top_n(&t, Column::VoteAverage, 2, SortOrder::Descending).unwrap();
        let v: Vec<_> = top.rows().iter().map(|r| r.record.vote_average).collect();
        assert_eq!(v, vec![Some(9.0), Some(7.0)]);
    }

    #[test]
    fn top_n_ties_keep_original_order() {
        let t = table(&[("A", 7.0, &[]), ("B", 9.0, &[]), ("C", 7.0, &[]), ("D", 7.0, &[])]);
        let desc = top_n(&t, Column::VoteAverage, 10, SortOrder::Descending).unwrap();
        let titles: Vec<_> = desc.rows().iter().map(|r| r.record.title.as_str()).collect();
        assert_eq!(titles, vec!["B", "A", "C", "D"]);
        let asc = top_n(&t, Column::VoteAverage, 2, SortOrder::Ascending).unwrap();
        let titles: Vec<_> = asc.rows().iter().map(|r| r.record.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "C"]);
    }

    #[test]
    fn mean_of_empty_table_is_an_error() {
        let t = MovieTable::default();
        assert!(matches!(mean(&t, Column::VoteAverage), Err(Error::EmptyInput(_))));
    }

    #[test]
    fn mean_of_missing_column_is_a_format_error() {
        let t = table(&[("A", 5.0, &[])]);
        assert!(matches!(mean(&t, Column::Revenue), Err(Error::DataFormat(_))));
        assert_eq!(mean(&t, Column::VoteAverage).unwrap(), 5.0);
    }

    #[test]
    fn monthly_trend_groups_by_period() {
        let recs = vec![
            MovieRecord::new("A", "2024-12-01", 8.0, &[]),
            MovieRecord::new("B", "2024-11-15", 6.0, &[]),
            MovieRecord::new("C", "2024-12-20", 6.0, &[]),
        ];
        let t = MovieTable::from_records(&recs).unwrap();
        let res = group_mean(&t, release_month, Column::VoteAverage).unwrap();
        assert_eq!(res.get(&MonthPeriod { year: 2024, month: 12 }), Some(&7.0));
        assert_eq!(res.get(&MonthPeriod { year: 2024, month: 11 }), Some(&6.0));
    }

    #[test]
    fn histogram_counts_and_closes_last_bin() {
        let t = table(&[("A", 0.0, &[]), ("B", 5.0, &[]), ("C", 10.0, &[]), ("D", 9.9, &[])]);
        let h = histogram(&t, Column::VoteAverage, 2).unwrap();
        assert_eq!(h.iter().map(|b| b.count).collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(h[1].upper, 10.0);
        assert_eq!(h[0].upper, 5.0);
    }

    #[test]
    fn value_on_an_inner_edge_lands_in_the_bin_it_opens() {
        // (1.88 - 1.5) / 0.38 floors to 0 although 1.88 is the lower edge of bin 1
        let t = table(&[("A", 1.5, &[]), ("B", 1.88, &[]), ("C", 9.1, &[])]);
        let h = histogram(&t, Column::VoteAverage, 20).unwrap();
        assert_eq!(h[1].lower, 1.88);
        assert_eq!(h[0].count, 1);
        assert_eq!(h[1].count, 1);
        assert_eq!(h[19].count, 1);
        for (i, b) in h.iter().enumerate() {
            if i + 1 < h.len() { assert_eq!(b.upper, h[i + 1].lower); }
        }
    }

    #[test]
    fn page_row_without_rating_fails_the_mean() {
        let body = r#"{"page":1,"results":[
            {"title":"A","release_date":"2024-12-01","vote_average":8.0},
            {"title":"B","release_date":"2024-12-02"}
        ]}"#;
        let recs = crate::fetcher::decode_page(1, body).unwrap();
        let t = crate::table::to_month_table(&recs, 2024, 12).unwrap();
        assert!(matches!(mean(&t, Column::VoteAverage), Err(Error::DataFormat(_))));
        assert!(matches!(top_n(&t, Column::VoteAverage, 1, SortOrder::Descending), Err(Error::DataFormat(_))));
        assert!(matches!(histogram(&t, Column::VoteAverage, 5), Err(Error::DataFormat(_))));
    }

    #[test]
    fn histogram_single_value_and_bad_input() {
        let t = table(&[("A", 7.0, &[]), ("B", 7.0, &[])]);
        let h = histogram(&t, Column::VoteAverage, 4).unwrap();
        assert_eq!(h[0].lower, 6.5);
        assert_eq!(h.iter().map(|b| b.count).sum::<usize>(), 2);
        assert!(matches!(histogram(&t, Column::VoteAverage, 0), Err(Error::InvalidArgument(_))));
        assert!(matches!(histogram(&MovieTable::default(), Column::VoteAverage, 3), Err(Error::EmptyInput(_))));
    }

    #[test]
    fn revenue_pairs_absent_without_revenue() {
        let mut recs = vec![MovieRecord::new("A", "2024-12-01", 7.0, &[]), MovieRecord::new("B", "2024-12-02", 6.0, &[])];
        assert!(revenue_pairs(&MovieTable::from_records(&recs).unwrap()).is_none());
        recs[1].revenue = Some(1_000);
        assert_eq!(revenue_pairs(&MovieTable::from_records(&recs).unwrap()), Some(vec![(1_000, 6.0)]));
    }
}
