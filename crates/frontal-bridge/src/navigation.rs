use std::str::FromStr;

/// Screens of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
    Chat,
    Relax,
    PhysicalHealth,
}

impl Route {
    pub fn as_str(&self) -> &'static str {
        match self {
            Route::Home => "home",
            Route::Login => "login",
            Route::Chat => "chat",
            Route::Relax => "relax",
            Route::PhysicalHealth => "physical-health",
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRoute(pub String);

impl std::fmt::Display for UnknownRoute {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "unknown route: {}", self.0)
    }
}

impl std::error::Error for UnknownRoute {}

impl FromStr for Route {
    type Err = UnknownRoute;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().trim_start_matches('/') {
            "" | "home" => Ok(Route::Home),
            "login" => Ok(Route::Login),
            "chat" => Ok(Route::Chat),
            "relax" => Ok(Route::Relax),
            "physical-health" => Ok(Route::PhysicalHealth),
            other => Err(UnknownRoute(other.to_string())),
        }
    }
}
