// File: trachub-core/src/migration.rs
//! The dry-run migration planner.
//!
//! Turns Trac tickets into the issues, comments and milestones that a migration would
//! create, without talking to GitHub. Everything the planner needs is carried by a
//! `MigrationContext` built for one run; nothing is kept between runs.
//!
//! License: MIT OR APACHE 2.0

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use log::{error, info, warn};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tinytemplate::{format_unescaped, TinyTemplate};

use crate::engine::MarkupTranslator;
use crate::errors::TrachubError;
use crate::escaping::{shortened, strip_cc_domains};
use crate::headless::build_translator;
use crate::issue_map::TicketToIssueMap;
use crate::mapping::{LabelMapping, LoginMapping};
use crate::settings::MigrationSettings;
use crate::tickets::{
    read_attachments, read_comments, read_tickets, AttachmentsByTicket, CommentsByTicket,
    Ticket, TicketAttachment, TicketComment,
};

/// Dates in footers, e.g. `03-04-2015 at 10:20`.
pub const DATE_FORMAT: &str = "%m-%d-%Y at %H:%M";

const TICKET_FOOTER: &str = "\n\n_Imported from trac ticket {ticket}, created by {reporter} on {created}, last modified: {modified}_\n";
const CC_LINE: &str = "   CCing: {cc}";
const ATTACHMENT_NOTE: &str = "_{author} attached [{filename}]({full_path}) on {date}_\n";
const COMMENT_FOOTER: &str = "{body}\n\n_Trac comment by {author} (github user: {login}) on {date}_\n";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentDraft {
    pub author: String,
    pub login: Option<String>,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueDraft {
    pub number: u64,
    pub ticket_id: u64,
    pub title: String,
    pub body: String,
    pub labels: Vec<String>,
    /// Number of the milestone in `MigrationPlan::milestones`.
    pub milestone: Option<u64>,
    pub assignee: Option<String>,
    pub closed: bool,
    pub comments: Vec<CommentDraft>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MilestoneDraft {
    pub number: u64,
    pub title: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MigrationPlan {
    pub repo: String,
    pub issues: Vec<IssueDraft>,
    pub milestones: Vec<MilestoneDraft>,
    /// Every label used by the planned issues, in first-seen order.
    pub labels: Vec<String>,
    /// Tickets that were read but not planned.
    pub skipped_tickets: Vec<u64>,
}

/// Everything one planning run needs.
pub struct MigrationContext {
    /// `owner/name` of the destination repository.
    pub repo: String,
    pub translator: Box<dyn MarkupTranslator>,
    pub ticket_map: Arc<TicketToIssueMap>,
    pub labels: LabelMapping,
    pub logins: LoginMapping,
    pub comments: CommentsByTicket,
    pub attachments: AttachmentsByTicket,
    pub trac_url: Option<String>,
    pub add_component_labels: bool,
    /// When non-empty, only these tickets are planned.
    pub tickets_to_render: Vec<u64>,
}

impl MigrationContext {
    fn repo_owner(&self) -> &str {
        self.repo.split_once('/').map_or(self.repo.as_str(), |(owner, _)| owner)
    }

    fn should_render(&self, ticket_id: u64) -> bool {
        self.tickets_to_render.is_empty() || self.tickets_to_render.contains(&ticket_id)
    }
}

#[derive(Serialize)]
struct TicketFooterContext<'a> {
    ticket: String,
    reporter: &'a str,
    created: String,
    modified: String,
}

#[derive(Serialize)]
struct CcContext {
    cc: String,
}

#[derive(Serialize)]
struct AttachmentContext<'a> {
    author: &'a str,
    filename: &'a str,
    full_path: &'a str,
    date: String,
}

#[derive(Serialize)]
struct CommentContext<'a> {
    body: &'a str,
    author: &'a str,
    login: &'a str,
    date: String,
}

fn format_date(date: &NaiveDateTime) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn templates() -> Result<TinyTemplate<'static>, TrachubError> {
    let mut tt = TinyTemplate::new();
    tt.set_default_formatter(&format_unescaped);
    for (name, text) in [
        ("ticket_footer", TICKET_FOOTER),
        ("cc_line", CC_LINE),
        ("attachment_note", ATTACHMENT_NOTE),
        ("comment_footer", COMMENT_FOOTER),
    ] {
        tt.add_template(name, text)
            .map_err(|e| TrachubError::TemplateError(name.to_string(), e.to_string()))?;
    }
    Ok(tt)
}

fn render<C: Serialize>(tt: &TinyTemplate<'_>, name: &str, context: &C) -> Result<String, TrachubError> {
    tt.render(name, context)
        .map_err(|e| TrachubError::TemplateError(name.to_string(), e.to_string()))
}

/// Plans a single ticket; `milestones` collects milestone titles across tickets.
struct Planner<'a> {
    ctx: &'a MigrationContext,
    tt: TinyTemplate<'static>,
    milestones: Vec<MilestoneDraft>,
    milestone_numbers: HashMap<String, u64>,
}

impl Planner<'_> {
    fn milestone_for(&mut self, title: &str) -> Option<u64> {
        let title = title.trim();
        if title.is_empty() {
            return None;
        }
        if let Some(number) = self.milestone_numbers.get(title) {
            return Some(*number);
        }
        let number = self.milestones.len() as u64 + 1;
        info!("add milestone: {}", title);
        self.milestones.push(MilestoneDraft {
            number,
            title: title.to_string(),
        });
        self.milestone_numbers.insert(title.to_string(), number);
        Some(number)
    }

    fn ticket_footer(&self, ticket: &Ticket) -> Result<String, TrachubError> {
        let mut ticket_ref = format!("#{}", ticket.id);
        if let Some(trac_url) = &self.ctx.trac_url {
            ticket_ref = format!("[{}]({}/ticket/{})", ticket_ref, trac_url, ticket.id);
        }
        let mut footer = render(
            &self.tt,
            "ticket_footer",
            &TicketFooterContext {
                ticket: ticket_ref,
                reporter: &ticket.reporter,
                created: format_date(&ticket.created),
                modified: format_date(&ticket.modified),
            },
        )?;
        if !ticket.cc.trim().is_empty() {
            let cc = strip_cc_domains(&ticket.cc).into_owned();
            footer.push_str(&render(&self.tt, "cc_line", &CcContext { cc })?);
        }
        Ok(footer)
    }

    fn labels_for(&self, ticket: &Ticket) -> Vec<String> {
        let mut labels = Vec::new();
        let mut add = |field: &str, value: &str| {
            if let Some(label) = self.ctx.labels.label_for(field, value) {
                info!("  add label \"{}\"", label);
                if !labels.iter().any(|l| l == label) {
                    labels.push(label.to_string());
                }
            }
        };
        add("type", &ticket.ticket_type);
        add("resolution", &ticket.resolution);
        add("priority", &ticket.priority);
        for keyword in &ticket.keywords {
            add("keyword", keyword);
        }
        let component = ticket.component.trim();
        if self.ctx.add_component_labels
            && !component.is_empty()
            && component != "None"
            && !labels.iter().any(|l| l == component)
        {
            labels.push(component.to_string());
        }
        labels
    }

    fn assignee_for(&self, ticket: &Ticket) -> Result<Option<String>, TrachubError> {
        let owner = ticket.owner.trim();
        if owner.is_empty() {
            return Ok(None);
        }
        let login = self.ctx.logins.login_for(owner)?;
        Ok((login != self.ctx.repo_owner()).then_some(login))
    }

    fn attachment_note(&self, attachment: &TicketAttachment) -> Result<CommentDraft, TrachubError> {
        let body = render(
            &self.tt,
            "attachment_note",
            &AttachmentContext {
                author: &attachment.author,
                filename: &attachment.filename,
                full_path: &attachment.full_path,
                date: format_date(&attachment.date),
            },
        )?;
        Ok(CommentDraft {
            author: attachment.author.clone(),
            login: None,
            body,
        })
    }

    fn comment(&self, ticket_id: u64, comment: &TicketComment) -> Result<CommentDraft, TrachubError> {
        let login = self.ctx.logins.login_for(&comment.author)?;
        let body = render(
            &self.tt,
            "comment_footer",
            &CommentContext {
                body: &comment.body,
                author: &comment.author,
                login: &login,
                date: format_date(&comment.date),
            },
        )?;
        let body = self.ctx.translator.translate(&body, Some(ticket_id))?;
        info!("  add comment by {}: {:?}", login, shortened(&body));
        Ok(CommentDraft {
            author: comment.author.clone(),
            login: Some(login),
            body,
        })
    }

    fn plan_ticket(&mut self, ticket: &Ticket, number: u64) -> Result<IssueDraft, TrachubError> {
        let ctx = self.ctx;
        info!("convert ticket #{}: {}", ticket.id, shortened(&ticket.summary));

        let title = ctx.translator.translate(&ticket.summary, None)?;
        let mut body = ctx.translator.translate(&ticket.description, Some(ticket.id))?;
        body.push_str(&self.ticket_footer(ticket)?);

        let milestone = self.milestone_for(&ticket.milestone);
        let assignee = self.assignee_for(ticket)?;
        info!(
            "  issue #{}: owner={}-->{}; milestone={} ({})",
            number,
            ticket.owner,
            assignee.as_deref().unwrap_or("-"),
            ticket.milestone.trim(),
            milestone.unwrap_or(0)
        );

        let mut comments = Vec::new();
        for attachment in ctx.attachments.get(&ticket.id).into_iter().flatten() {
            comments.push(self.attachment_note(attachment)?);
        }
        for comment in ctx.comments.get(&ticket.id).into_iter().flatten() {
            comments.push(self.comment(ticket.id, comment)?);
        }

        if !ctx.tickets_to_render.is_empty() {
            info!("body of ticket #{}:\n{}", ticket.id, body);
            for comment in &comments {
                info!("comment body:\n{}", comment.body);
            }
        }

        let closed = ticket.status == "closed";
        if closed {
            info!("  close issue");
        }

        Ok(IssueDraft {
            number,
            ticket_id: ticket.id,
            title,
            body,
            labels: self.labels_for(ticket),
            milestone,
            assignee,
            closed,
            comments,
        })
    }
}

/// Plans the issues for every ticket in the ticket-to-issue map.
///
/// Any failure aborts the whole plan and names the ticket it happened on.
pub fn plan_migration(tickets: &[Ticket], ctx: &MigrationContext) -> Result<MigrationPlan, TrachubError> {
    let mut planner = Planner {
        ctx,
        tt: templates()?,
        milestones: Vec::new(),
        milestone_numbers: HashMap::new(),
    };
    let mut plan = MigrationPlan {
        repo: ctx.repo.clone(),
        ..Default::default()
    };
    let mut seen_labels = BTreeSet::new();

    for ticket in tickets {
        let number = match ctx.ticket_map.get(ticket.id) {
            Some(number) if ctx.should_render(ticket.id) => number,
            _ => {
                info!("skip ticket #{}: {}", ticket.id, shortened(&ticket.summary));
                plan.skipped_tickets.push(ticket.id);
                continue;
            }
        };
        let issue = planner
            .plan_ticket(ticket, number)
            .map_err(|source| TrachubError::TicketConversion {
                ticket_id: ticket.id,
                source: Box::new(source),
            })?;
        for label in &issue.labels {
            if seen_labels.insert(label.clone()) {
                plan.labels.push(label.clone());
            }
        }
        plan.issues.push(issue);
    }

    plan.milestones = planner.milestones;
    info!(
        "Planned {} issues, {} milestones, {} labels; skipped {} tickets.",
        plan.issues.len(),
        plan.milestones.len(),
        plan.labels.len(),
        plan.skipped_tickets.len()
    );
    Ok(plan)
}

/// Reads all inputs named by `settings` and plans the migration.
pub fn plan_from_settings(settings: &MigrationSettings) -> Result<MigrationPlan> {
    let tickets = read_tickets(&settings.tickets)?;
    let ticket_map = Arc::new(TicketToIssueMap::build(
        tickets.iter().map(|t| t.id),
        &settings.numbering(),
    ));

    let comments = match &settings.comments {
        Some(path) => read_comments(path)?,
        None => CommentsByTicket::new(),
    };
    let attachments = match (&settings.attachments, &settings.attachments_prefix) {
        (Some(path), Some(prefix)) => read_attachments(path, prefix)?,
        (Some(path), None) => {
            error!(
                "Attachments file {} is set but attachments_prefix is not; ignoring attachments.",
                path.display()
            );
            AttachmentsByTicket::new()
        }
        (None, _) => AttachmentsByTicket::new(),
    };
    if !settings.convert_text {
        warn!("convert_text is off; ticket texts are copied without markup translation.");
    }

    let translator = build_translator(settings.translator_options()?, Arc::clone(&ticket_map))
        .context("Failed to build the markup translator")?;
    let ctx = MigrationContext {
        repo: settings.repo.clone(),
        translator,
        ticket_map,
        labels: settings.label_mapping()?,
        logins: settings.login_mapping()?,
        comments,
        attachments,
        trac_url: settings.trac_url.clone(),
        add_component_labels: settings.add_component_labels,
        tickets_to_render: settings.tickets_to_render.clone(),
    };

    Ok(plan_migration(&tickets, &ctx)?)
}
