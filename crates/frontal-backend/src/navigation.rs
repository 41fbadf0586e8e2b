use frontal_bridge::{auth::User, navigation::Route};

/// Decides which screen to show for a requested route.
///
/// Home, chat and the relaxation screen are public. Screens that store
/// data for an account send signed-out users to the login screen instead.
pub fn resolve_route(requested: Route, user: Option<&User>) -> Route {
    match (requested, user) {
        (Route::PhysicalHealth, None) => Route::Login,
        // nothing to log into twice
        (Route::Login, Some(_)) => Route::Home,
        (route, _) => route,
    }
}
