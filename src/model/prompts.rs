//! Default agent prompt templates and the board's AGENT.md text.
//!
//! Templates use the `{{.Field}}` / `{{range .Tickets}}…{{end}}` syntax
//! understood by `parse::template`.

/// Prompt for a single ticket. Fields: `Title`, `Tags`, `Content`,
/// `TicketPath`, `DoingPath`, `DonePath`.
pub const DEFAULT_SINGLE_TICKET_PROMPT: &str = r#"Implement the task described in this ticket: @{{.TicketPath}}

## Guidelines
- First, read and understand the ticket requirements thoroughly
- Plan your approach before writing code
- Follow the existing coding style, patterns, and conventions of this project
- Keep changes focused - only modify what's necessary for the task
- Ensure existing functionality is not broken
- Test your changes if the project has tests

## Workflow
1. Move the ticket to doing: mv "{{.TicketPath}}" "{{.DoingPath}}"
2. Implement the task as described in the ticket
3. When complete, move the ticket to done: mv "{{.DoingPath}}" "{{.DonePath}}"
4. Update the agent_feedback field in the ticket's YAML frontmatter with a brief summary of the changes made
"#;

/// Prompt for every ticket in the first column. `Tickets` holds one record
/// per ticket with the single-ticket fields.
pub const DEFAULT_BATCH_TICKET_PROMPT: &str = r#"Implement the tasks described in the following tickets, in order:
{{range .Tickets}}
- @{{.TicketPath}}
{{- end}}

## Guidelines
- Read and understand each ticket's requirements before starting
- Plan your approach for each task before writing code
- Follow the existing coding style, patterns, and conventions of this project
- Keep changes focused - only modify what's necessary for each task
- Ensure existing functionality is not broken
- Test your changes if the project has tests
- Complete each ticket fully before moving to the next

## Workflow (for each ticket)
1. Move the ticket to doing: mv "<ticket_path>" ".kanban/doing/<filename>"
2. Implement the task as described in the ticket
3. When complete, move the ticket to done: mv ".kanban/doing/<filename>" ".kanban/done/<filename>"
4. Update the agent_feedback field in the ticket's YAML frontmatter with a brief summary of the changes made

Process tickets in the order listed above.
"#;

/// File name of the agent instructions written into the board directory.
pub const AGENT_FILE_NAME: &str = "AGENT.md";

/// Contents of `AGENT.md`.
pub const AGENT_INSTRUCTIONS: &str = r#"# Kanban Agent Instructions

This directory is a kanban board stored as markdown files. Every ticket is a
markdown file with a YAML header, kept in the directory of its column.

## Layout

```
.kanban/
├── AGENT.md        # this file
├── config.toml     # board configuration
├── todo/           # tasks to be done
├── doing/          # tasks in progress
└── done/           # completed tasks
```

## Ticket format

```markdown
---
title: Task title
tags:
- tag1
- tag2
created: 2025-01-01T10:00:00Z
updated: 2025-01-01T10:00:00Z
agent_feedback: Summary of work done
---

Task description in markdown.
```

| Field | Required | Meaning |
|-------|----------|---------|
| title | yes | short task title |
| tags | no | list of tags |
| created | yes | RFC 3339 time the ticket was created |
| updated | yes | RFC 3339 time the ticket was last changed |
| agent_feedback | no | summary of the changes made, added on completion |

Other header keys are ignored. Filenames are `YYYY-MM-DD-slugified-title.md`,
for example `2025-01-15-implement-user-auth.md`.

## Creating a ticket

Write a new file into a column directory:

```bash
cat > .kanban/todo/$(date +%Y-%m-%d)-my-new-task.md << EOF
---
title: My new task
tags: [feature]
created: $(date -u +%Y-%m-%dT%H:%M:%SZ)
updated: $(date -u +%Y-%m-%dT%H:%M:%SZ)
---

What needs to be done.
EOF
```

or run `kanban add "My new task" --tag feature --body "What needs to be done."`.

## Moving a ticket

Move the file to another column directory:

```bash
mv .kanban/todo/2025-01-15-my-task.md .kanban/doing/
mv .kanban/doing/2025-01-15-my-task.md .kanban/done/
```

or run `kanban mv todo/2025-01-15-my-task.md done`.

## Updating a ticket

Set `updated` to the current time whenever the ticket changes. When the task
is complete, add `agent_feedback` with a short summary and move the ticket to
`done/`.

## Workflow

1. Start: move the ticket from `todo/` to `doing/`
2. Work: implement the task as described
3. Finish: add `agent_feedback`, move the ticket to `done/`

## Configuration

`config.toml` (or a `config.yaml` with the same keys, where the board
directory may be given as `kanban_dir`) sets:

- `board_dir`: root directory of the board
- `columns`: column names, directories and colors
- `editor`: external editor command
- `single_ticket_prompt`: template for a single ticket's agent prompt
- `batch_ticket_prompt`: template for the prompt covering the first column

Templates substitute `{{.TicketPath}}`, `{{.DoingPath}}`, `{{.DonePath}}`,
`{{.Title}}`, `{{.Tags}}` and `{{.Content}}`; the batch template loops with
`{{range .Tickets}}...{{end}}`.
"#;
