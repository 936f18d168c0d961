pub mod slug;
pub mod template;
pub mod ticket_parser;
pub mod ticket_serializer;

pub use slug::{slugify, ticket_filename};
pub use ticket_parser::{ParseError, parse_ticket, split_header};
pub use template::{Template, TemplateError, render_template};
pub use ticket_serializer::serialize_ticket;
