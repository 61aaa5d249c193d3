//! Shared fixtures for parser tests: a compact synthetic full-text
//! submission exercising sections, a titled table with a footnote, and a
//! tagged-fact instance document.

/// Three `<DOCUMENT>` blocks: the 10-K report body, an XBRL instance with
/// facts, and a description-less graphic that the orchestrator drops.
pub fn sample_submission() -> String {
    let report_body = r#"<html><body>
<div><font style="font-weight:bold;">Net Operating Revenues</font></div>
<table>
<tr><td style="border-bottom:1px solid #000000;"></td><td style="border-bottom:1px solid #000000;">2019</td><td style="border-bottom:1px solid #000000;">2018</td></tr>
<tr><td>Revenue</td><td>(1,200)</td><td>950</td></tr>
</table>
<div><font>____________</font></div>
<table><tr><td>(1) Includes one-time charges.</td></tr></table>
<div><font style="font-weight:bold;">Item 1.</font></div>
<div><font style="font-weight:bold;">Business</font></div>
<div><font style="font-family:inherit;font-size:10pt;">We manufacture and distribute beverages worldwide.</font></div>
<div><font style="font-weight:bold;">Item 1A.</font></div>
<div><font style="font-weight:bold;">Risk Factors</font></div>
<div><font style="font-family:inherit;font-size:10pt;">Demand may decline.</font></div>
</body></html>"#;

    let instance_body = r#"<us-gaap:Revenues contextRef="FY2019Q4YTD" unitRef="USD">125000</us-gaap:Revenues>
<ko:CaseVolume contextRef="FY2019Q4">77</ko:CaseVolume>
<us-gaap:EarningsPerShare contextRef="FY2019Q4YTD">1.25</us-gaap:EarningsPerShare>"#;

    format!(
        "<SEC-DOCUMENT>0000021344-20-000006.txt\n\
         <ACCEPTANCE-DATETIME>20200224163503\n\
         ACCESSION NUMBER: 0000021344-20-000006\n\
         FILED AS OF DATE:  20200224\n\
         <DOCUMENT>\n<TYPE>10-K\n<SEQUENCE>1\n<FILENAME>a2019123110-k.htm\n<DESCRIPTION>ANNUAL REPORT\n<TEXT>\n{}\n</TEXT>\n</DOCUMENT>\n\
         <DOCUMENT>\n<TYPE>EX-101.INS\n<SEQUENCE>2\n<FILENAME>ko-20191231.xml\n<DESCRIPTION>XBRL INSTANCE DOCUMENT\n<TEXT>\n<XBRL>\n{}\n</XBRL>\n</TEXT>\n</DOCUMENT>\n\
         <DOCUMENT>\n<TYPE>GRAPHIC\n<SEQUENCE>3\n<FILENAME>chart.jpg\n<TEXT>\nbinary payload\n</TEXT>\n</DOCUMENT>\n\
         </SEC-DOCUMENT>\n",
        report_body, instance_body
    )
}
