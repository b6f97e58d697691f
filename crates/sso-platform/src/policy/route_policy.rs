//! Route Authorization Policy
//!
//! Static table classifying request paths as public or protected, plus the
//! redirect targets used by the login flow. Built once at startup.

/// Access level of a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Reachable without a session
    Public,
    /// Requires an authenticated session
    Protected,
}

/// What to do with an unauthenticated request to a protected path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnauthenticatedAction {
    /// Browser navigation: send to the login page
    RedirectToLogin,
    /// Let the handler run without a principal
    Continue,
}

/// Path pattern: a literal path or a `/prefix/**` wildcard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathPattern {
    Exact(String),
    /// Matches the prefix itself and anything below it at a segment boundary.
    /// An empty prefix (from `/**`) matches every path.
    Prefix(String),
}

impl PathPattern {
    pub fn parse(pattern: &str) -> Self {
        match pattern.strip_suffix("/**") {
            Some(prefix) => PathPattern::Prefix(prefix.to_string()),
            None => PathPattern::Exact(pattern.to_string()),
        }
    }

    pub fn matches(&self, path: &str) -> bool {
        match self {
            PathPattern::Exact(p) => p == path,
            PathPattern::Prefix(prefix) => match path.strip_prefix(prefix.as_str()) {
                Some(rest) => rest.is_empty() || rest.starts_with('/'),
                None => false,
            },
        }
    }

    /// Ordering key for overlapping patterns: literals first, then longer prefixes.
    fn specificity(&self) -> (bool, usize) {
        match self {
            PathPattern::Exact(p) => (true, p.len()),
            PathPattern::Prefix(p) => (false, p.len()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RouteRule {
    pub pattern: PathPattern,
    pub access: Access,
}

/// Paths reachable without authentication.
pub const PUBLIC_PATTERNS: &[&str] = &[
    "/",
    "/login",
    "/error",
    "/webjars/**",
    "/css/**",
    "/js/**",
    "/actuator/health",
    "/oauth2/authorization/**",
    "/login/oauth2/code/**",
];

/// Request paths under this prefix are API calls, never redirected.
const API_PREFIX: &str = "/api/";

#[derive(Debug, Clone)]
pub struct RoutePolicy {
    rules: Vec<RouteRule>,
    login_page: String,
    success_url: String,
    failure_url: String,
    logout_success_url: String,
}

impl Default for RoutePolicy {
    fn default() -> Self {
        PUBLIC_PATTERNS
            .iter()
            .fold(Self::empty(), |policy, pattern| policy.permit(pattern))
    }
}

impl RoutePolicy {
    /// Policy with no rules; everything is protected.
    pub fn empty() -> Self {
        Self {
            rules: Vec::new(),
            login_page: "/login".to_string(),
            success_url: "/home".to_string(),
            failure_url: "/login?error=true".to_string(),
            logout_success_url: "/".to_string(),
        }
    }

    pub fn permit(self, pattern: &str) -> Self {
        self.rule(pattern, Access::Public)
    }

    pub fn protect(self, pattern: &str) -> Self {
        self.rule(pattern, Access::Protected)
    }

    fn rule(mut self, pattern: &str, access: Access) -> Self {
        self.rules.push(RouteRule {
            pattern: PathPattern::parse(pattern),
            access,
        });
        self
    }

    /// Classify a request path.
    ///
    /// The most specific matching rule decides; among equally specific rules
    /// the first declared wins. Paths matching no rule are protected.
    pub fn classify(&self, path: &str) -> Access {
        let mut best: Option<&RouteRule> = None;
        for rule in self.rules.iter().filter(|r| r.pattern.matches(path)) {
            match best {
                Some(current) if current.pattern.specificity() >= rule.pattern.specificity() => {}
                _ => best = Some(rule),
            }
        }
        best.map(|r| r.access).unwrap_or(Access::Protected)
    }

    pub fn is_public(&self, path: &str) -> bool {
        self.classify(path) == Access::Public
    }

    pub fn unauthenticated_action(&self, path: &str) -> UnauthenticatedAction {
        if path.starts_with(API_PREFIX) {
            UnauthenticatedAction::Continue
        } else {
            UnauthenticatedAction::RedirectToLogin
        }
    }

    pub fn login_page(&self) -> &str {
        &self.login_page
    }

    pub fn success_url(&self) -> &str {
        &self.success_url
    }

    pub fn failure_url(&self) -> &str {
        &self.failure_url
    }

    pub fn logout_success_url(&self) -> &str {
        &self.logout_success_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_paths() {
        let policy = RoutePolicy::default();
        assert_eq!(policy.classify("/"), Access::Public);
        assert_eq!(policy.classify("/login"), Access::Public);
        assert_eq!(policy.classify("/error"), Access::Public);
        assert_eq!(policy.classify("/css/app.css"), Access::Public);
        assert_eq!(policy.classify("/js/app.js"), Access::Public);
        assert_eq!(policy.classify("/webjars/bootstrap/5.0/bootstrap.min.css"), Access::Public);
        assert_eq!(policy.classify("/actuator/health"), Access::Public);
        assert_eq!(policy.classify("/oauth2/authorization/azure"), Access::Public);
        assert_eq!(policy.classify("/login/oauth2/code/azure"), Access::Public);
    }

    #[test]
    fn test_protected_paths() {
        let policy = RoutePolicy::default();
        assert_eq!(policy.classify("/home"), Access::Protected);
        assert_eq!(policy.classify("/api/user/me"), Access::Protected);
        assert_eq!(policy.classify("/api/user/attributes"), Access::Protected);
        assert_eq!(policy.classify("/actuator/env"), Access::Protected);
        assert_eq!(policy.classify("/logout"), Access::Protected);
        assert_eq!(policy.classify("/anything/else"), Access::Protected);
    }

    #[test]
    fn test_prefix_respects_segment_boundary() {
        let policy = RoutePolicy::default();
        assert_eq!(policy.classify("/css"), Access::Public);
        assert_eq!(policy.classify("/cssx/app.css"), Access::Protected);
        assert_eq!(policy.classify("/login/other"), Access::Protected);
        assert_eq!(policy.classify("/actuator/health/liveness"), Access::Protected);
    }

    #[test]
    fn test_exact_beats_wildcard() {
        let policy = RoutePolicy::empty()
            .permit("/docs/**")
            .protect("/docs/private");
        assert_eq!(policy.classify("/docs/readme"), Access::Public);
        assert_eq!(policy.classify("/docs/private"), Access::Protected);
    }

    #[test]
    fn test_longest_prefix_wins() {
        let policy = RoutePolicy::empty()
            .protect("/static/**")
            .permit("/static/public/**");
        assert_eq!(policy.classify("/static/secret.txt"), Access::Protected);
        assert_eq!(policy.classify("/static/public/logo.png"), Access::Public);
    }

    #[test]
    fn test_is_public() {
        let policy = RoutePolicy::default();
        assert!(policy.is_public("/login"));
        assert!(policy.is_public("/js/app.js"));
        assert!(!policy.is_public("/home"));
        assert!(!policy.is_public("/api/user/me"));
    }

    #[test]
    fn test_first_declared_wins_tie() {
        let policy = RoutePolicy::empty().permit("/dup").protect("/dup");
        assert_eq!(policy.classify("/dup"), Access::Public);
    }

    #[test]
    fn test_catch_all_pattern() {
        let policy = RoutePolicy::empty().permit("/**");
        assert_eq!(policy.classify("/"), Access::Public);
        assert_eq!(policy.classify("/a/b"), Access::Public);
    }

    #[test]
    fn test_unauthenticated_action() {
        let policy = RoutePolicy::default();
        assert_eq!(
            policy.unauthenticated_action("/home"),
            UnauthenticatedAction::RedirectToLogin
        );
        assert_eq!(
            policy.unauthenticated_action("/api/user/me"),
            UnauthenticatedAction::Continue
        );
    }

    #[test]
    fn test_redirect_targets() {
        let policy = RoutePolicy::default();
        assert_eq!(policy.login_page(), "/login");
        assert_eq!(policy.success_url(), "/home");
        assert_eq!(policy.failure_url(), "/login?error=true");
        assert_eq!(policy.logout_success_url(), "/");
    }
}
