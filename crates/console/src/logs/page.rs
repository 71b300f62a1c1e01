//! HTML fragments for the log pages.

use std::fmt::Write;

use crate::spip::Topology;

pub const SELECT_LOG: &str = "<p>Please select a Log to be viewed</p>\n";
pub const SELECT_STREAM: &str = "<p>Please select a Stream to be viewed</p>\n";

/// Emitted once the viewer has caught up with the file's history.
pub const SCROLL_TO_BOTTOM: &str = "<script type=\"text/javascript\">self.scrollBy(0,1000000);</script>\n";

pub const VIEWER_FOOTER: &str = "</pre></body>\n</html>\n";

/// Everything up to the open `<pre>` that the log lines stream into.
pub fn viewer_header(autoscroll: bool) -> String {
    format!(
        r#"<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.0 Strict//EN"
  "http://www.w3.org/TR/xhtml1/DTD/xhtml1-strict.dtd">
<html xmlns="http://www.w3.org/1999/xhtml">
<head>
  <script type="text/javascript">

    var auto_scroll = {autoscroll};

    function looper() {{
      scrollDown();
      setTimeout('looper()',250)
    }}

    function scrollDown() {{
      if (auto_scroll) {{
        self.scrollByLines(1000);
      }}
    }}

  </script>
</head>

<body>
<script type="text/javascript">looper()</script>
<pre>
<p>
"#
    )
}

/// Log selection page: server and client log pickers next to the viewer frame.
pub fn selection_page(topology: &Topology) -> String {
    let mut html = String::from(SELECTION_HEAD);

    html.push_str("<div id='sidebar'>\n<h3>Server Logs</h3>\n<table class='log_select'>\n");
    html.push_str("  <tr>\n    <th>Log</th>\n    <td>\n");
    html.push_str("      <select name='server_log' id='server_log' onChange='show_server_logs()'>\n");
    html.push_str("        <option value='' selected>--</option>\n");
    for log in &topology.server_logs {
        let _ = writeln!(html, "        <option value='{0}'>{0}</option>", log);
    }
    html.push_str("      </select>\n    </td>\n  </tr>\n</table>\n");

    html.push_str("<h3>Client Logs</h3>\n<table class='log_select'>\n");
    html.push_str("  <tr>\n    <th>Log</th>\n    <td>\n");
    html.push_str("      <select name='client_log' id='client_log' onChange='show_client_logs()'>\n");
    html.push_str("        <option value='' selected>--</option>\n");
    for log in &topology.client_logs {
        let _ = writeln!(html, "        <option value='{0}'>{0}</option>", log);
    }
    html.push_str("      </select>\n    </td>\n  </tr>\n");

    html.push_str("  <tr>\n    <th>Stream</th>\n    <td>\n");
    html.push_str("      <select id='client_stream' name='client_stream' onChange='show_client_logs()'>\n");
    html.push_str("        <option value='' selected>--</option>\n");
    for stream in &topology.streams {
        let _ = writeln!(
            html,
            "        <option value='{}'>{}</option>",
            stream.index, stream.description
        );
    }
    html.push_str("      </select>\n    </td>\n  </tr>\n</table>\n</div>\n");

    html.push_str(
        "<iframe name='log_viewer' id='log_viewer' frameborder='0' src='/logs/viewer' width='700px' height='500px'>\n</iframe>\n",
    );
    html.push_str("</body>\n</html>\n");
    html
}

const SELECTION_HEAD: &str = r#"<!DOCTYPE html>
<html>
<head>
  <title>Log Files</title>
  <script type='text/javascript'>

    function selected(id) {
      var select = document.getElementById(id);
      return select.options[select.selectedIndex].value;
    }

    function show_server_logs() {
      var log = selected('server_log');
      if (log != "") {
        log_viewer.document.location = "/logs/viewer?server_log=" + log;
      }
    }

    function show_client_logs() {
      var log = selected('client_log');
      var stream = selected('client_stream');
      if ((log != "") && (stream != "")) {
        log_viewer.document.location = "/logs/viewer?client_log=" + log + "&stream=" + stream;
      }
    }

  </script>
  <style type='text/css'>
    #sidebar { float: left; margin-right: 10px; }
    .log_select th { text-align: right; padding-right: 5px; width: 50px; }
    .log_select td { text-align: left; }
  </style>
</head>
<body>
"#;
