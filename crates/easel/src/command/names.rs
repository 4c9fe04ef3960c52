//! Names of the built-in commands.

pub const SHAPE_CREATE: &str = "shape.create";
pub const SHAPE_DELETE: &str = "shape.delete";
pub const SHAPE_APPEND: &str = "shape.append";
pub const SHAPE_MOVE: &str = "shape.move";
pub const SHAPE_RESIZE: &str = "shape.resize";
pub const SHAPE_TOGGLE_COLLAPSE: &str = "shape.toggleCollapse";
pub const SHAPE_ATTACH: &str = "shape.attach";

pub const ELEMENTS_DELETE: &str = "elements.delete";
pub const ELEMENTS_MOVE: &str = "elements.move";
/// Alias of [`ELEMENTS_MOVE`].
pub const SHAPES_MOVE: &str = "shapes.move";
pub const ELEMENTS_ALIGN: &str = "elements.align";
pub const ELEMENTS_DISTRIBUTE: &str = "elements.distribute";
pub const ELEMENT_UPDATE_ATTACHMENT: &str = "element.updateAttachment";

pub const CONNECTION_CREATE: &str = "connection.create";
pub const CONNECTION_DELETE: &str = "connection.delete";
pub const CONNECTION_MOVE: &str = "connection.move";
pub const CONNECTION_RECONNECT_START: &str = "connection.reconnectStart";
pub const CONNECTION_RECONNECT_END: &str = "connection.reconnectEnd";
pub const CONNECTION_UPDATE_WAYPOINTS: &str = "connection.updateWaypoints";
pub const CONNECTION_LAYOUT: &str = "connection.layout";

pub const LABEL_CREATE: &str = "label.create";
pub const ID_UPDATE_CLAIM: &str = "id.updateClaim";
pub const SPACE_TOOL: &str = "spaceTool";
