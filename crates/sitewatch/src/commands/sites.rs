//! Site command handlers.

use std::sync::Arc;

use serde::Serialize;
use tabled::Tabled;

use sitewatch_core::{
    HttpMonitor, Reachability, RecordId, Registration, SiteAggregate, SiteUpdate, SiteView,
    latest_status,
};

use crate::cli::{GlobalOpts, SitesArgs, SitesCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct SiteRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "URL")]
    url: String,
    #[tabled(rename = "Intervals (s)")]
    intervals: String,
    #[tabled(rename = "Statuses")]
    statuses: String,
    #[tabled(rename = "Current")]
    current: String,
}

impl SiteRow {
    fn new(site: &SiteAggregate, color: bool) -> Self {
        let view = SiteView::from(site);
        Self {
            id: view.id,
            name: view.name,
            url: view.url,
            intervals: view.intervals,
            statuses: view.statuses,
            current: output::paint_reachability(latest_status(site), color),
        }
    }
}

fn site_detail(site: &SiteAggregate, color: bool) -> String {
    let view = SiteView::from(site);
    output::detail_block(&[
        ("ID", view.id),
        ("Name", view.name),
        ("URL", view.url),
        ("Intervals (s)", view.intervals),
        ("Statuses", view.statuses),
        (
            "Current",
            output::paint_reachability(latest_status(site), color),
        ),
    ])
}

fn registration_detail(reg: &Registration, color: bool) -> String {
    let na = || "not recorded".to_owned();
    output::detail_block(&[
        ("ID", reg.site.id.to_string()),
        ("Name", reg.site.site_name.clone()),
        ("URL", reg.site.site_url.clone()),
        (
            "Interval",
            reg.interval
                .as_ref()
                .map_or_else(na, |i| format!("{}s", i.time_interval)),
        ),
        (
            "Status",
            output::paint_reachability(Some(reg.reachability), color),
        ),
        (
            "Recorded",
            if reg.status.is_some() { "yes".into() } else { na() },
        ),
    ])
}

#[derive(Serialize)]
struct CheckResult {
    site_id: RecordId,
    reachability: Reachability,
}

// ── Handler ─────────────────────────────────────────────────────────

#[allow(clippy::too_many_lines)]
pub async fn handle(
    monitor: &HttpMonitor,
    args: SitesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let color = output::should_color(global.color);

    match args.command {
        SitesCommand::List => {
            let snap = monitor.list_sites().await?;
            let out = output::render_list(
                global.output,
                snap.as_slice(),
                |s: &Arc<SiteAggregate>| SiteRow::new(s, color),
                |s| s.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        SitesCommand::Show { id } => {
            let site = monitor.get_site(&RecordId::from(id)).await?;
            let out = output::render_single(
                global.output,
                site.as_ref(),
                |s| site_detail(s, color),
                |s| s.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        SitesCommand::Add {
            name,
            url,
            interval,
        } => {
            let spinner = util::spinner(&format!("Registering {url}"), global.quiet);
            let result = monitor.register_site(&name, &url, interval).await;
            if let Some(pb) = spinner {
                pb.finish_and_clear();
            }
            let reg = result?;

            if !global.quiet {
                if reg.interval.is_none() {
                    eprintln!("warning: site created but its check interval was not recorded");
                }
                if reg.status.is_none() {
                    eprintln!("warning: site created but its initial status was not recorded");
                }
            }

            let out = output::render_single(
                global.output,
                &reg,
                |r| registration_detail(r, color),
                |r| r.site.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        SitesCommand::Update { id, name, url } => {
            let site = monitor
                .update_site(
                    &RecordId::from(id),
                    SiteUpdate {
                        site_name: name,
                        site_url: url,
                    },
                )
                .await?;
            let out = output::render_single(
                global.output,
                site.as_ref(),
                |s| site_detail(s, color),
                |s| s.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        SitesCommand::Interval { id, seconds } => {
            let id = RecordId::from(id);
            let interval = monitor.set_interval(&id, seconds).await?;
            let out = output::render_single(
                global.output,
                &interval,
                |i| format!("Check interval for site {id} set to {}s", i.time_interval),
                |i| i.time_interval.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        SitesCommand::Check { id } => {
            let id = RecordId::from(id);
            let reachability = monitor.check_site(&id).await?;
            let result = CheckResult {
                site_id: id,
                reachability,
            };
            let out = output::render_single(
                global.output,
                &result,
                |r| {
                    format!(
                        "Site {} is {}",
                        r.site_id,
                        output::paint_reachability(Some(r.reachability), color)
                    )
                },
                |r| r.reachability.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        SitesCommand::Delete { id } => {
            let id = RecordId::from(id);
            let label = monitor
                .cached_site(&id)
                .map_or_else(|| id.to_string(), |s| format!("{} ({})", s.site_name, id));
            if !util::confirm(
                &format!("Delete site {label}? Its history goes with it."),
                "sites delete",
                global.yes,
            )? {
                return Ok(());
            }
            monitor.delete_site(&id).await?;
            if !global.quiet {
                eprintln!("Site {id} deleted");
            }
            Ok(())
        }
    }
}
