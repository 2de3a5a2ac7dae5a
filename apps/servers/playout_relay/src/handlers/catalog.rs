use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct CommandDoc {
	pub param: &'static str,
	pub info: &'static str,
}

#[derive(Debug, Serialize)]
pub struct SectionDoc {
	pub section: &'static str,
	pub info: &'static str,
	pub endpoint: &'static str,
	pub commands: Vec<CommandDoc>,
}

#[derive(Debug, Serialize)]
pub struct Catalog {
	pub sections: Vec<SectionDoc>,
}

const fn cmd(param: &'static str, info: &'static str) -> CommandDoc {
	CommandDoc { param, info }
}

pub fn catalog() -> Catalog {
	Catalog {
		sections: vec![
			SectionDoc {
				section: "Direct commands",
				info: "Commands which do not require a rundown to be loaded",
				endpoint: "/api/v1/",
				commands: vec![
					cmd(
						"invokeTemplateFunction?playserver=OVERLAY&playchannel=1&playlayer=19&webplayout=19&function=myCustomTemplateFunction&params=Hello%20World",
						"GET Calls a function inside a template on the given server, channel and layer.",
					),
					cmd(
						"directplayout",
						"POST Populate a template and play, continue or stop it. JSON body: casparServer, casparChannel, casparLayer, webplayoutLayer, relativeTemplatePath, command, dataformat, DataFields [{field, value}].",
					),
					cmd(
						"controlRundownItemByID?file=HelloWorld-project/My%20first%20rundown&item=1616702200909&command=play",
						"GET Play, continue or stop an item of a stored rundown.",
					),
				],
			},
			SectionDoc {
				section: "Helpers",
				info: "Utility calls",
				endpoint: "/api/v1/",
				commands: vec![
					cmd("feedproxy?url=http://corsfeed.net&format=xml", "GET Fetch a feed from a CORS protected source and pass it through."),
					cmd(
						"panic",
						"GET Clear every output layer without out-animations. Optional ?server=NAME limits the backend clear to one server. For emergencies only, not a STOP substitute.",
					),
					cmd("changeItemID?rundownfile=<path>&ID=<old>&newID=<new>", "GET Rename a rundown item. Fails with 409 if the new ID is taken."),
				],
			},
			SectionDoc {
				section: "Rundown commands and navigation",
				info: "Load rundowns and move focus in the opened rundown",
				endpoint: "/api/v1/rundown/",
				commands: vec![
					cmd("load?file=MyFirstProject/MyFirstRundown", "GET Open rundown from project / file."),
					cmd("focusFirst", "GET Move focus to the first item on the rundown."),
					cmd("focusNext", "GET Move focus down to the next item, does not wrap at the end."),
					cmd("focusPrevious", "GET Move focus up to the previous item, does not wrap at the top."),
					cmd("focusLast", "GET Move focus to the last item on the rundown."),
					cmd("stopAllLayers", "GET Animate out all layers used by the current rundown without clearing them."),
				],
			},
			SectionDoc {
				section: "Item commands",
				info: "Control the focused item, or an item by ID",
				endpoint: "/api/v1/item/",
				commands: vec![
					cmd("play", "GET Start the focused item."),
					cmd("play/<itemID>", "GET Start the item with the given ID."),
					cmd("continue", "GET Issue continue to the focused item."),
					cmd("continue/<itemID>", "GET Issue continue to the item with the given ID."),
					cmd("stop", "GET Stop the focused item."),
					cmd("stop/<itemID>", "GET Stop the item with the given ID."),
				],
			},
		],
	}
}

pub async fn api_index() -> Json<Catalog> {
	Json(catalog())
}
