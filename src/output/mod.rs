mod styling;

use gitbeaker::BaseService;

use styling::{cyan, dim, magenta_bold};

/// Prints the gitbeaker banner to stderr.
pub fn print_banner() {
    eprintln!(
        r"
{} {}
  {}
",
        magenta_bold("gitbeaker"),
        dim(env!("CARGO_PKG_VERSION")),
        dim("GitLab API request inspector")
    );
}

/// Prints a one-glance description of a service to stderr.
pub fn print_service_summary(service: &BaseService) {
    let header_names: Vec<&str> = service.headers().keys().map(String::as_str).collect();

    eprintln!("{} {}", dim("base url:"), cyan(service.url()));
    eprintln!("{} {}", dim("auth:    "), cyan(service.auth_mode().kind()));
    eprintln!("{} {}", dim("headers: "), header_names.join(", "));
    eprintln!(
        "{} {}ms",
        dim("timeout: "),
        service.request_timeout().as_millis()
    );
    eprintln!();
}
