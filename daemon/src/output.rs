//! Plain-text rendering of overviews and the known list.

use std::fmt::Write as _;

use repwatch_monitor::{FullOverview, KnownEntry, RepresentativeStatus};
use repwatch_utils::format_days_since;

/// Names of the flags set on `status`, in a fixed order.
pub fn status_flags(status: &RepresentativeStatus) -> Vec<&'static str> {
    [
        (status.online, "online"),
        (status.very_high_weight, "very-high-weight"),
        (status.high_weight, "high-weight"),
        (status.very_low_uptime, "very-low-uptime"),
        (status.low_uptime, "low-uptime"),
        (status.closing, "closing"),
        (status.marked_to_avoid, "avoid"),
        (status.marked_as_nf, "non-functional"),
        (status.trusted, "trusted"),
        (status.known, "known"),
        (status.change_required, "change-required"),
    ]
    .into_iter()
    .filter_map(|(set, name)| set.then_some(name))
    .collect()
}

pub fn render_overview(overviews: &[FullOverview]) -> String {
    if overviews.is_empty() {
        return "no representatives\n".to_string();
    }

    let rows: Vec<[String; 7]> = overviews
        .iter()
        .map(|rep| {
            [
                rep.tier.to_string(),
                rep.display_name(),
                format!("{:.2}%", rep.percent_of_online_stake),
                rep.status
                    .uptime
                    .map(|u| format!("{u:.1}%"))
                    .unwrap_or_else(|| "-".to_string()),
                if rep.status.uptime.is_some() {
                    format_days_since(rep.status.days_since_last_voted)
                } else {
                    "-".to_string()
                },
                rep.accounts.len().to_string(),
                status_flags(&rep.status).join(","),
            ]
        })
        .collect();

    render_table(
        ["TIER", "REPRESENTATIVE", "WEIGHT", "UPTIME", "LAST VOTE", "ACCOUNTS", "FLAGS"],
        &rows,
    )
}

pub fn render_known(entries: &[KnownEntry]) -> String {
    if entries.is_empty() {
        return "no known representatives\n".to_string();
    }
    let rows: Vec<[String; 3]> = entries
        .iter()
        .map(|e| {
            let marker = match (e.trusted, e.warn) {
                (true, _) => "trusted",
                (false, true) => "warn",
                (false, false) => "",
            };
            [e.name.clone(), e.id.to_string(), marker.to_string()]
        })
        .collect();
    render_table(["NAME", "ID", "MARK"], &rows)
}

fn render_table<const N: usize>(header: [&str; N], rows: &[[String; N]]) -> String {
    let mut widths = header.map(str::len);
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let mut push_row = |cells: Vec<&str>| {
        let line: Vec<String> = cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect();
        let _ = writeln!(out, "{}", line.join("  ").trim_end());
    };
    push_row(header.to_vec());
    for row in rows {
        push_row(row.iter().map(String::as_str).collect());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use repwatch_monitor::{Classification, DelegateWeight, LedgerAccountInfo, StatusTier};
    use repwatch_types::{RawAmount, RepAddress};

    fn overview(label: Option<&str>, status: RepresentativeStatus, tier: StatusTier) -> FullOverview {
        FullOverview::compose(
            DelegateWeight {
                id: RepAddress::new("ban_3batmanuenphd7osrez9c45b3uqw9d9u81ne8xa6m43e1py56y9p48ap69zg"),
                weight: RawAmount::new(10),
                accounts: Vec::new(),
            },
            LedgerAccountInfo::default(),
            Classification {
                tier,
                label: label.map(str::to_string),
                status,
                percent: 6.5,
            },
            None,
        )
    }

    #[test]
    fn flags_in_order() {
        let status = RepresentativeStatus {
            online: true,
            high_weight: true,
            change_required: true,
            ..Default::default()
        };
        assert_eq!(status_flags(&status), vec!["online", "high-weight", "change-required"]);
        assert!(status_flags(&RepresentativeStatus::default()).is_empty());
    }

    #[test]
    fn overview_table_has_header_and_rows() {
        let table = render_overview(&[
            overview(
                Some("Batman"),
                RepresentativeStatus {
                    uptime: Some(99.5),
                    days_since_last_voted: 2,
                    ..Default::default()
                },
                StatusTier::Ok,
            ),
            overview(None, RepresentativeStatus::default(), StatusTier::Unknown),
        ]);

        let lines: Vec<_> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("TIER"));
        assert!(lines[1].starts_with("ok "));
        assert!(lines[1].contains("Batman"));
        assert!(lines[1].contains("6.50%"));
        assert!(lines[1].contains("99.5%"));
        assert!(lines[1].contains("2 days ago"));
        assert!(lines[2].contains("ban_3batman...ap69zg"));
        assert!(lines[2].starts_with("unknown"));
    }

    #[test]
    fn empty_lists() {
        assert_eq!(render_overview(&[]), "no representatives\n");
        assert_eq!(render_known(&[]), "no known representatives\n");
    }

    #[test]
    fn known_table_marks_entries() {
        let table = render_known(&[
            KnownEntry::new("ban_a", "Alpha").trusted(true),
            KnownEntry::new("ban_b", "Beta").warn(true),
            KnownEntry::new("ban_c", "Gamma"),
        ]);
        let lines: Vec<_> = table.lines().collect();
        assert!(lines[1].ends_with("trusted"));
        assert!(lines[2].ends_with("warn"));
        assert!(lines[3].ends_with("ban_c"));
    }
}
