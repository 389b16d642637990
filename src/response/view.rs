use serde_json::Value;

use super::core::{Response, Status};

/// Renders one kind of entity as JSON.
///
/// Implementors supply [`JsonView::render`]; list rendering and response
/// construction come for free.
///
/// ```rust
/// use apidispatch::response::{JsonView, Status};
/// use serde_json::{json, Value};
///
/// struct User { id: u32, name: &'static str }
/// struct UserView;
///
/// impl JsonView for UserView {
///     type Entity = User;
///     fn render(&self, user: &User) -> Value {
///         json!({ "id": user.id, "name": user.name })
///     }
/// }
///
/// let users = [User { id: 1, name: "ada" }, User { id: 2, name: "bob" }];
/// let res = UserView.multiple(&users, Status::Ok);
/// assert_eq!(res.json_data().unwrap()[1]["name"], "bob");
/// ```
pub trait JsonView {
    /// Entity type rendered by this view.
    type Entity;

    /// Render a single entity.
    fn render(&self, entity: &Self::Entity) -> Value;

    /// Render entities in iteration order as a JSON array.
    fn render_multiple<'a, I>(&self, entities: I) -> Value
    where
        I: IntoIterator<Item = &'a Self::Entity>,
        Self::Entity: 'a,
    {
        Value::Array(entities.into_iter().map(|e| self.render(e)).collect())
    }

    /// JSON response for one entity.
    fn single(&self, entity: &Self::Entity, status: Status) -> Response {
        Response::json(status, self.render(entity))
    }

    /// JSON response for a list of entities.
    fn multiple<'a, I>(&self, entities: I, status: Status) -> Response
    where
        I: IntoIterator<Item = &'a Self::Entity>,
        Self::Entity: 'a,
    {
        Response::json(status, self.render_multiple(entities))
    }
}
