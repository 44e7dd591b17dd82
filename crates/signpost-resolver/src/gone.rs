//! The static page served with `410 Gone`.
//!
//! The page is self-contained so the status reaches crawlers even when the
//! renderer would answer its own gone page with 200.

pub const GONE_STATUS: u16 = 410;
pub const GONE_CONTENT_TYPE: &str = "text/html; charset=utf-8";

pub const GONE_PAGE_HTML: &str = r##"<!doctype html>
<html lang="en">
  <head>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1" />
    <meta name="robots" content="noindex, nofollow" />
    <title>410 Gone</title>
    <style>
      body { margin:0; font-family: ui-sans-serif, system-ui, -apple-system, "Segoe UI", Roboto, Arial, sans-serif; background:#fafbfc; color:#111827; }
      .container { max-width: 72rem; margin: 0 auto; padding: 1.5rem; min-height: 100vh; display:flex; align-items:center; justify-content:center; }
      .card { text-align:center; }
      .code { font-size: 3rem; font-weight:700; color:#dc2626; margin: 0 0 0.75rem; }
      .title { font-size: 1.5rem; font-weight:600; margin: 0 0 1rem; }
      .text { color:#4b5563; margin: 0 0 2rem; }
      .home { display:inline-block; background:#16a34a; color:white; padding:.75rem 1.25rem; border-radius:.5rem; text-decoration:none; font-weight:600; }
      .home:hover { background:#15803d; }
      .muted { margin-top:2rem; font-size:.875rem; color:#6b7280; }
    </style>
  </head>
  <body>
    <div class="container">
      <main class="card">
        <div class="code">410</div>
        <h1 class="title">Content No Longer Available</h1>
        <p class="text">This resource has been intentionally removed and is no longer accessible.</p>
        <a class="home" href="/">Go Home</a>
        <div class="muted">If you believe this is an error, please contact support.</div>
      </main>
    </div>
  </body>
</html>
"##;
